use crate::{Event, EventKind, IdHex, PublicKeyHex, Unixtime};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A NIP-01 filter specifying which events a client is looking for
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Filter {
    /// Events which match these ids
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub ids: Vec<IdHex>,

    /// Events which match these authors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub authors: Vec<PublicKeyHex>,

    /// Events which match these kinds
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub kinds: Vec<EventKind>,

    /// Events which match the given single-letter tags, keyed by letter
    #[serde(
        flatten,
        serialize_with = "serialize_tags",
        deserialize_with = "deserialize_tags"
    )]
    pub tags: BTreeMap<char, Vec<String>>,

    /// Events occuring after this date
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub since: Option<Unixtime>,

    /// Events occuring before this date
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub until: Option<Unixtime>,

    /// A limit on the number of events to return in the initial query
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Filter {
    /// Create a new, empty Filter
    pub fn new() -> Filter {
        Default::default()
    }

    /// The filter for zap receipts (kind 9735) whose `p` tag names the given key
    pub fn zap_receipts_for(pubkey: &PublicKeyHex) -> Filter {
        let mut filter = Filter::new();
        filter.add_event_kind(EventKind::Zap);
        filter.add_tag_value('p', pubkey.as_str().to_owned());
        filter
    }

    /// Add an EventKind to the filter
    pub fn add_event_kind(&mut self, event_kind: EventKind) {
        if !self.kinds.contains(&event_kind) {
            self.kinds.push(event_kind);
        }
    }

    /// Add a Tag value to a filter
    pub fn add_tag_value(&mut self, letter: char, value: String) {
        let values = self.tags.entry(letter).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Set all values for a given tag
    pub fn set_tag_values(&mut self, letter: char, values: Vec<String>) {
        let _ = self.tags.insert(letter, values);
    }

    /// Does the event match the filter?
    pub fn event_matches(&self, e: &Event) -> bool {
        if !self.ids.is_empty() && !self.ids.contains(&e.id) {
            return false;
        }

        if !self.authors.is_empty() && !self.authors.contains(&e.pubkey) {
            return false;
        }

        if !self.kinds.is_empty() && !self.kinds.contains(&e.kind) {
            return false;
        }

        if let Some(since) = self.since {
            if e.created_at < since {
                return false;
            }
        }

        if let Some(until) = self.until {
            if e.created_at > until {
                return false;
            }
        }

        self.tags.iter().all(|(letter, values)| {
            e.tags
                .iter()
                .any(|tag| tag.is_letter(*letter) && values.iter().any(|v| v == tag.value()))
        })
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> Filter {
        let mut filter = Filter::zap_receipts_for(&PublicKeyHex::mock());
        filter.since = Some(Unixtime::mock());
        filter
    }
}

fn serialize_tags<S>(tags: &BTreeMap<char, Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(tags.len()))?;
    for (letter, values) in tags.iter() {
        map.serialize_entry(&format!("#{letter}"), values)?;
    }
    map.end()
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeMap<char, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = BTreeMap<char, Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("map with keys in \"#x\" format")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut tags: BTreeMap<char, Vec<String>> = BTreeMap::new();
            while let Some(key) = map.next_key::<String>()? {
                let mut chars = key.chars();
                if let (Some('#'), Some(ch), None) = (chars.next(), chars.next(), chars.next()) {
                    let _ = tags.insert(ch, map.next_value()?);
                } else {
                    let _ = map.next_value::<serde::de::IgnoredAny>()?;
                }
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_map(TagsVisitor)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Tag;

    test_serde! {Filter, test_filter_serde}

    #[test]
    fn test_zap_filter_wire_format() {
        let key = PublicKeyHex::mock();
        assert_eq!(
            &serde_json::to_string(&Filter::zap_receipts_for(&key)).unwrap(),
            r##"{"kinds":[9735],"#p":["7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e"]}"##
        );
    }

    #[test]
    fn test_filter_from_wire() {
        let json = r##"{"kinds":[9735],"#p":["abc"],"limit":10}"##;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.kinds, vec![EventKind::Zap]);
        assert_eq!(filter.tags.get(&'p'), Some(&vec!["abc".to_owned()]));
        assert_eq!(filter.limit, Some(10));
    }

    #[test]
    fn test_add_tag_value_dedups() {
        let mut filter = Filter::new();
        filter.add_tag_value('p', "abc".to_owned());
        filter.add_tag_value('p', "abc".to_owned());
        filter.add_tag_value('p', "def".to_owned());
        assert_eq!(filter.tags.get(&'p').map(|v| v.len()), Some(2));
        filter.set_tag_values('p', vec![]);
        assert_eq!(filter.tags.get(&'p'), Some(&vec![]));
    }

    #[test]
    fn test_event_matches() {
        let key = PublicKeyHex::mock();
        let filter = Filter::zap_receipts_for(&key);

        let mut event = Event::mock();
        assert!(filter.event_matches(&event));

        // The uppercase P tag (the zap sender) must not satisfy a #p filter
        event.tags = vec![Tag::new(&["P", key.as_str()])];
        assert!(!filter.event_matches(&event));

        let mut event = Event::mock();
        event.kind = EventKind::TextNote;
        assert!(!filter.event_matches(&event));

        let mut filter = Filter::zap_receipts_for(&key);
        filter.since = Some(Unixtime(event.created_at.0 + 1));
        assert!(!filter.event_matches(&Event::mock()));
    }
}
