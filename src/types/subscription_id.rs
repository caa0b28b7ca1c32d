use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// A client-chosen string used to refer to a subscription
#[derive(
    AsRef, Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> SubscriptionId {
        SubscriptionId("zaps0".to_owned())
    }
}
