use serde::de::Error as DeError;
use serde::de::{Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::convert::From;
use std::fmt;

macro_rules! define_event_kinds {
    ($($comment:expr, $name:ident = $value:expr),*) => {
        /// A kind of Event
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum EventKind {
            $(
                #[doc = $comment]
                $name,
            )*
            /// Something else?
            Other(u32),
        }

        impl From<u32> for EventKind {
            fn from(u: u32) -> Self {
                match u {
                    $($value => EventKind::$name,)*
                    x => EventKind::Other(x),
                }
            }
        }

        impl From<EventKind> for u32 {
            fn from(e: EventKind) -> u32 {
                match e {
                    $(EventKind::$name => $value,)*
                    EventKind::Other(u) => u,
                }
            }
        }
    };
}

define_event_kinds!(
    "Event is a text note (NIP-01)",
    TextNote = 1,
    "Zap Request (NIP-57)",
    ZapRequest = 9734,
    "Zap Receipt (NIP-57)",
    Zap = 9735
);

impl EventKind {
    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> EventKind {
        EventKind::Zap
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u: u32 = From::from(*self);
        match *self {
            EventKind::Other(_) => write!(f, "kind {u}"),
            _ => write!(f, "{self:?} (kind {u})"),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let u: u32 = From::from(*self);
        serializer.serialize_u32(u)
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u32(EventKindVisitor)
    }
}

struct EventKindVisitor;

impl Visitor<'_> for EventKindVisitor {
    type Value = EventKind;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an unsigned number identifying an event kind")
    }

    fn visit_u32<E>(self, v: u32) -> Result<EventKind, E>
    where
        E: DeError,
    {
        Ok(From::<u32>::from(v))
    }

    // JsonValue numbers come in as u64
    fn visit_u64<E>(self, v: u64) -> Result<EventKind, E>
    where
        E: DeError,
    {
        let u = u32::try_from(v).map_err(|_| E::custom(format!("event kind {v} out of range")))?;
        Ok(From::<u32>::from(u))
    }
}
