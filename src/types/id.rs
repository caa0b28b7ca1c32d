use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// An event identifier as relays send it: the hex SHA256 of the event per NIP-01.
///
/// It is treated as opaque here since event ids are never recomputed.
#[derive(
    AsRef, Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
pub struct IdHex(pub String);

impl IdHex {
    /// As &str
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> IdHex {
        IdHex("5df64b33303d62afc799bdc36d178c07b2e1f0d824f31b7dc812219440affab6".to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    test_serde! {IdHex, test_id_hex_serde}
}
