use crate::Error;
use derive_more::{AsRef, Deref, Display, Into};
use serde::{Deserialize, Serialize};

/// A websocket URL of a relay, validated to have a `ws` or `wss` scheme and a host
#[derive(
    AsRef,
    Clone,
    Debug,
    Deref,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize,
)]
pub struct RelayUrl(String);

impl RelayUrl {
    /// Create a new RelayUrl from a string, if it is a valid relay URL
    pub fn try_from_str(s: &str) -> Result<RelayUrl, Error> {
        let url = url::Url::parse(s.trim())?;

        if url.scheme() != "wss" && url.scheme() != "ws" {
            return Err(Error::InvalidUrlScheme(url.scheme().to_owned()));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(Error::InvalidUrlMissingHost),
        }

        Ok(RelayUrl(url.as_str().to_owned()))
    }

    /// As &str
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> RelayUrl {
        RelayUrl("wss://relay.damus.io/".to_owned())
    }
}

impl TryFrom<&str> for RelayUrl {
    type Error = Error;

    fn try_from(s: &str) -> Result<RelayUrl, Error> {
        RelayUrl::try_from_str(s)
    }
}
