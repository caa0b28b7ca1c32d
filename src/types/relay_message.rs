use super::{Event, IdHex, SubscriptionId};
use serde::de::Error as DeError;
use serde::de::{Deserialize, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// A message from a relay to a client
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelayMessage {
    /// An event matching a subscription
    Event(SubscriptionId, Box<Event>),

    /// A human readable notice for errors and other information
    Notice(String),

    /// End of subscribed events notification
    Eose(SubscriptionId),

    /// Used to notify clients if an event was successful
    Ok(IdHex, bool, String),

    /// The relay closed (or refused) the subscription
    Closed(SubscriptionId, String),

    /// An authentication challenge. Authentication is not supported, these are only logged.
    Auth(String),
}

impl RelayMessage {
    /// The subscription this message belongs to, if any
    pub fn subscription_id(&self) -> Option<&SubscriptionId> {
        match self {
            RelayMessage::Event(sub, _) | RelayMessage::Eose(sub) | RelayMessage::Closed(sub, _) => {
                Some(sub)
            }
            _ => None,
        }
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> RelayMessage {
        RelayMessage::Event(SubscriptionId::mock(), Box::new(Event::mock()))
    }
}

impl Serialize for RelayMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RelayMessage::Event(id, event) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("EVENT")?;
                seq.serialize_element(&id)?;
                seq.serialize_element(&event)?;
                seq.end()
            }
            RelayMessage::Notice(s) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("NOTICE")?;
                seq.serialize_element(&s)?;
                seq.end()
            }
            RelayMessage::Eose(id) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("EOSE")?;
                seq.serialize_element(&id)?;
                seq.end()
            }
            RelayMessage::Ok(id, ok, message) => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("OK")?;
                seq.serialize_element(&id)?;
                seq.serialize_element(&ok)?;
                seq.serialize_element(&message)?;
                seq.end()
            }
            RelayMessage::Closed(id, message) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("CLOSED")?;
                seq.serialize_element(&id)?;
                seq.serialize_element(&message)?;
                seq.end()
            }
            RelayMessage::Auth(challenge) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("AUTH")?;
                seq.serialize_element(&challenge)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for RelayMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RelayMessageVisitor)
    }
}

struct RelayMessageVisitor;

impl<'de> Visitor<'de> for RelayMessageVisitor {
    type Value = RelayMessage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RelayMessage, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let word: String = seq
            .next_element()?
            .ok_or_else(|| DeError::custom("Message missing initial string field"))?;
        let output = match word.as_str() {
            "EVENT" => {
                let id: SubscriptionId = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                let event: Event = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing event field"))?;
                RelayMessage::Event(id, Box::new(event))
            }
            "NOTICE" => {
                let s: String = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing string field"))?;
                RelayMessage::Notice(s)
            }
            "EOSE" => {
                let id: SubscriptionId = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                RelayMessage::Eose(id)
            }
            "OK" => {
                let id: IdHex = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                let ok: bool = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing ok field"))?;
                let message: String = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing string field"))?;
                RelayMessage::Ok(id, ok, message)
            }
            "CLOSED" => {
                let id: SubscriptionId = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                // The reason is optional in practice
                let message: String = seq.next_element()?.unwrap_or_default();
                RelayMessage::Closed(id, message)
            }
            "AUTH" => {
                let challenge: String = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing challenge field"))?;
                RelayMessage::Auth(challenge)
            }
            _ => return Err(DeError::custom(format!("Unknown Message: {word}"))),
        };

        // Consume any trailing fields
        while let Some(_ignored) = seq.next_element::<IgnoredAny>()? {}

        Ok(output)
    }
}
