use super::{Filter, SubscriptionId};
use serde::de::Error as DeError;
use serde::de::{Deserialize, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// A message from a client to a relay. Only the reading half of NIP-01 is spoken.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientMessage {
    /// A subscription request
    Req(SubscriptionId, Vec<Filter>),

    /// A request to close a subscription
    Close(SubscriptionId),
}

impl ClientMessage {
    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> ClientMessage {
        ClientMessage::Req(SubscriptionId::mock(), vec![Filter::mock()])
    }
}

impl Serialize for ClientMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ClientMessage::Req(id, filters) => {
                let mut seq = serializer.serialize_seq(Some(2 + filters.len()))?;
                seq.serialize_element("REQ")?;
                seq.serialize_element(&id)?;
                for filter in filters {
                    seq.serialize_element(&filter)?;
                }
                seq.end()
            }
            ClientMessage::Close(id) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("CLOSE")?;
                seq.serialize_element(&id)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ClientMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ClientMessageVisitor)
    }
}

struct ClientMessageVisitor;

impl<'de> Visitor<'de> for ClientMessageVisitor {
    type Value = ClientMessage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<ClientMessage, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let word: String = seq
            .next_element()?
            .ok_or_else(|| DeError::custom("Message missing initial string field"))?;
        let output = match word.as_str() {
            "REQ" => {
                let id: SubscriptionId = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                let mut filters: Vec<Filter> = vec![];
                while let Some(filter) = seq.next_element::<Filter>()? {
                    filters.push(filter);
                }
                ClientMessage::Req(id, filters)
            }
            "CLOSE" => {
                let id: SubscriptionId = seq
                    .next_element()?
                    .ok_or_else(|| DeError::custom("Message missing id field"))?;
                ClientMessage::Close(id)
            }
            _ => return Err(DeError::custom(format!("Unknown Message: {word}"))),
        };

        // Consume any trailing fields
        while let Some(_ignored) = seq.next_element::<IgnoredAny>()? {}

        Ok(output)
    }
}
