mod client_message;
pub use client_message::ClientMessage;

mod event;
pub use event::Event;

mod event_kind;
pub use event_kind::EventKind;

mod filter;
pub use filter::Filter;

mod id;
pub use id::IdHex;

mod public_key;
pub use public_key::{normalize, PublicKeyHex};

mod relay_message;
pub use relay_message::RelayMessage;

mod satoshi;
pub use satoshi::MilliSatoshi;

mod subscription_id;
pub use subscription_id::SubscriptionId;

mod tag;
pub use tag::Tag;

mod unixtime;
pub use unixtime::Unixtime;

mod url;
pub use self::url::RelayUrl;

mod zap_data;
pub use zap_data::ZapData;
