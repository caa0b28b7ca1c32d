use crate::types::{IdHex, MilliSatoshi, PublicKeyHex};

/// Data about a Zap, read from a zap receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZapData {
    /// The event that was zapped. None when a profile was zapped rather than a note.
    pub zapped_event: Option<IdHex>,

    /// The amount that was zapped, if the receipt states one
    pub amount: Option<MilliSatoshi>,

    /// The public key of the person who received the zap
    pub payee: PublicKeyHex,

    /// The public key of the person who paid the zap, if known
    pub payer: Option<PublicKeyHex>,

    /// The public key of the zap provider (the receipt author)
    pub provider: PublicKeyHex,

    /// The comment left by the payer in the zap request
    pub comment: Option<String>,
}
