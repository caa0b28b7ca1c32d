use chrono::{DateTime, Local, TimeZone};
use derive_more::{AsMut, AsRef, Deref, From, Into};
use serde::{Deserialize, Serialize};

/// An integer count of the number of seconds from 1st January 1970.
/// This does not count any of the leap seconds that have occurred, it
/// simply presumes UTC never had leap seconds; yet it is well known
/// and well understood.
#[derive(
    AsMut,
    AsRef,
    Clone,
    Copy,
    Debug,
    Deref,
    Deserialize,
    Eq,
    From,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Unixtime(pub i64);

impl Unixtime {
    /// As a local date and time, if representable
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.0, 0).single()
    }

    /// Render as a human readable local date and time
    pub fn to_local_string(&self) -> String {
        match self.to_local() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("@{}", self.0),
        }
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> Unixtime {
        Unixtime(1668572286)
    }
}
