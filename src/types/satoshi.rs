use derive_more::{AsRef, Deref, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Bitcoin amount measured in millisatoshi
#[derive(
    AsRef,
    Clone,
    Copy,
    Debug,
    Default,
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
pub struct MilliSatoshi(pub u64);

impl MilliSatoshi {
    /// Whole satoshis, rounding down
    pub fn as_sats(&self) -> u64 {
        self.0 / 1000
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> MilliSatoshi {
        MilliSatoshi(21000)
    }
}

impl Add<MilliSatoshi> for MilliSatoshi {
    type Output = Self;

    fn add(self, rhs: MilliSatoshi) -> Self::Output {
        MilliSatoshi(self.0 + rhs.0)
    }
}

impl fmt::Display for MilliSatoshi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{} sats", self.as_sats())
        } else {
            write!(f, "{} msats", self.0)
        }
    }
}
