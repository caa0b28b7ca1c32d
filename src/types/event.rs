use super::{EventKind, IdHex, MilliSatoshi, PublicKeyHex, Tag, Unixtime, ZapData};
use crate::Error;
use lightning_invoice::Bolt11Invoice;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The main event type, as received from a relay.
///
/// Signatures are carried but never verified.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Event {
    /// The Id of the event, generated as a SHA256 of the inner event data
    pub id: IdHex,

    /// The public key of the actor who created the event
    pub pubkey: PublicKeyHex,

    /// The (unverified) time at which the event was created
    pub created_at: Unixtime,

    /// The kind of event
    pub kind: EventKind,

    /// A set of tags that apply to the event
    pub tags: Vec<Tag>,

    /// The content of the event
    pub content: String,

    /// The signature of the event, as a hex string
    pub sig: String,
}

impl Event {
    /// The value of the first tag with the given name, if any
    pub fn first_tag_value(&self, tagname: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.tagname() == tagname && !t.value().is_empty())
            .map(|t| t.value())
    }

    /// If this event is a zap receipt, get data about the zap.
    ///
    /// The payee (`p` tag) is required. The amount comes from the `bolt11`
    /// invoice, falling back to the `amount` tag of the zap request embedded
    /// in the `description` tag. Nothing here is verified.
    ///
    /// Errors returned from this are not fatal, but may be useful for
    /// explaining to a user why a zap receipt is invalid.
    pub fn zap_data(&self) -> Result<Option<ZapData>, Error> {
        if self.kind != EventKind::Zap {
            return Ok(None);
        }

        let payee = match self.first_tag_value("p") {
            Some(p) => PublicKeyHex::from_wire(p),
            None => return Err(Error::ZapReceipt("missing p tag".to_owned())),
        };

        let zapped_event = self.first_tag_value("e").map(|e| IdHex(e.to_owned()));

        let request = match self.first_tag_value("description") {
            Some(json) => {
                let request: Event = serde_json::from_str(json).map_err(|e| {
                    Error::ZapReceipt(format!("description is not an event: {e}"))
                })?;
                if request.kind != EventKind::ZapRequest {
                    return Err(Error::ZapReceipt(format!(
                        "description is a {}, not a zap request",
                        request.kind
                    )));
                }
                Some(request)
            }
            None => None,
        };

        let mut amount: Option<MilliSatoshi> = None;
        if let Some(bolt11) = self.first_tag_value("bolt11") {
            let invoice = Bolt11Invoice::from_str(bolt11)
                .map_err(|e| Error::ZapReceipt(format!("bolt11 failed to parse: {e}")))?;
            amount = invoice.amount_milli_satoshis().map(MilliSatoshi);
        }
        if amount.is_none() {
            if let Some(value) = request.as_ref().and_then(|r| r.first_tag_value("amount")) {
                let msats = value
                    .parse::<u64>()
                    .map_err(|e| Error::ZapReceipt(format!("bad zap request amount: {e}")))?;
                amount = Some(MilliSatoshi(msats));
            }
        }

        let payer = match self.first_tag_value("P") {
            Some(p) => Some(PublicKeyHex::from_wire(p)),
            None => request.as_ref().map(|r| r.pubkey.clone()),
        };

        let comment = request
            .map(|r| r.content)
            .filter(|content| !content.is_empty());

        Ok(Some(ZapData {
            zapped_event,
            amount,
            payee,
            payer,
            provider: self.pubkey.clone(),
            comment,
        }))
    }

    // Mock zap request for testing
    #[allow(dead_code)]
    pub(crate) fn mock_zap_request() -> Event {
        Event {
            id: IdHex("a3b0c1de8f3f7e0a9a6d4ac1c4bd8a1ad1b0f0a0c2b8d1e4f6a7b8c9d0e1f2a3".to_owned()),
            pubkey: PublicKeyHex::from_wire(
                "32e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245",
            ),
            created_at: Unixtime(1668572280),
            kind: EventKind::ZapRequest,
            tags: vec![
                Tag::new(&["relays", "wss://relay.damus.io"]),
                Tag::new(&["amount", "21000"]),
                Tag::new(&["p", PublicKeyHex::mock().as_str()]),
                Tag::new(&["e", IdHex::mock().as_str()]),
            ],
            content: "Great post!".to_owned(),
            sig: "00".repeat(64),
        }
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> Event {
        let description = serde_json::to_string(&Event::mock_zap_request()).unwrap_or_default();
        Event {
            id: IdHex("9f5ec59ce2a5ebe0ef1fa5d03e1d3e0e02b1cf2d3ee4a4bd3e33f6b3cfb0d7c1".to_owned()),
            pubkey: PublicKeyHex::from_wire(
                "79f00d3f5a19ec806189fcab03c1be4ff81d18ee4f653c88fac41fe03570f432",
            ),
            created_at: Unixtime::mock(),
            kind: EventKind::Zap,
            tags: vec![
                Tag::new(&["p", PublicKeyHex::mock().as_str()]),
                Tag::new(&["e", IdHex::mock().as_str()]),
                Tag::new(&["description", &description]),
            ],
            content: "".to_owned(),
            sig: "00".repeat(64),
        }
    }
}
