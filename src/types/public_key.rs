use crate::{Error, FormatError};
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use derive_more::{AsRef, Deref, Display, Into};
use serde::{Deserialize, Serialize};

const NPUB: Hrp = Hrp::parse_unchecked("npub");

/// A public key as a 64 character hex string, the canonical form used in queries.
///
/// User input is turned into one of these with [`normalize`]. Keys that arrive
/// inside relay events are deserialized as-is.
#[derive(AsRef, Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Into, PartialEq, Serialize)]
pub struct PublicKeyHex(String);

impl PublicKeyHex {
    /// Export as a bech32 encoded `npub` string
    pub fn as_bech32_string(&self) -> Result<String, Error> {
        let bytes: Vec<u8> = hex::decode(&self.0)?;
        if bytes.len() != 32 {
            return Err(Error::InvalidPublicKey);
        }
        Ok(bech32::encode::<Bech32>(NPUB, &bytes)?)
    }

    // Keys found inside events are taken as they come
    pub(crate) fn from_wire(s: &str) -> PublicKeyHex {
        PublicKeyHex(s.to_owned())
    }

    /// As &str
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Into String
    pub fn into_string(self) -> String {
        self.0
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> PublicKeyHex {
        PublicKeyHex("7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e".to_owned())
    }
}

/// Normalize user input into a [`PublicKeyHex`].
///
/// Input starting with `npub` is decoded as NIP-19 bech32 (the bech32m checksum
/// is rejected). Otherwise any input of exactly 64 UTF-16 code units is taken
/// verbatim; the characters are NOT checked to be hex.
pub fn normalize(input: &str) -> Result<PublicKeyHex, FormatError> {
    if input.starts_with("npub") {
        let checked = CheckedHrpstring::new::<Bech32>(input)
            .map_err(|e| FormatError::DecodeFailed(e.to_string()))?;
        if checked.hrp() != NPUB {
            return Err(FormatError::WrongKeyType);
        }
        let data: Vec<u8> = checked.byte_iter().collect();
        if data.len() != 32 {
            return Err(FormatError::DecodeFailed(format!(
                "expected 32 bytes of key data, found {}",
                data.len()
            )));
        }
        Ok(PublicKeyHex(hex::encode(data)))
    } else if input.encode_utf16().count() == 64 {
        Ok(PublicKeyHex(input.to_owned()))
    } else {
        Err(FormatError::UnrecognizedFormat)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bech32::Bech32m;

    const NPUB_STR: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";
    const HEX_STR: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

    test_serde! {PublicKeyHex, test_public_key_hex_serde}

    #[test]
    fn test_normalize_known_npub() {
        let key = normalize(NPUB_STR).unwrap();
        assert_eq!(key.as_str(), HEX_STR);
    }

    #[test]
    fn test_normalize_encoded_bytes() {
        let bytes: Vec<u8> = (0..32).collect();
        let npub = bech32::encode::<Bech32>(NPUB, &bytes).unwrap();
        let key = normalize(&npub).unwrap();
        assert_eq!(key.as_str(), hex::encode(&bytes));
        assert_eq!(key.as_bech32_string().unwrap(), npub);
    }

    #[test]
    fn test_normalize_any_64_chars() {
        let input = "a".repeat(64);
        assert_eq!(normalize(&input).unwrap().as_str(), input);

        // Not hex, still accepted
        let input = "z".repeat(64);
        assert_eq!(normalize(&input).unwrap().into_string(), input);
    }

    #[test]
    fn test_normalize_counts_utf16_units() {
        // 32 chars outside the BMP are 64 UTF-16 code units
        let input = "\u{1F600}".repeat(32);
        assert_eq!(normalize(&input).unwrap().as_str(), input);

        let input = "\u{e9}".repeat(64);
        assert_eq!(normalize(&input).unwrap().as_str(), input);

        assert_eq!(
            normalize(&"\u{1F600}".repeat(64)),
            Err(FormatError::UnrecognizedFormat)
        );
    }

    #[test]
    fn test_normalize_rejects_bech32m() {
        let bytes: Vec<u8> = (0..32).collect();
        let npub = bech32::encode::<Bech32m>(NPUB, &bytes).unwrap();
        assert!(matches!(normalize(&npub), Err(FormatError::DecodeFailed(_))));
    }

    #[test]
    fn test_normalize_wrong_length() {
        assert_eq!(normalize("abc"), Err(FormatError::UnrecognizedFormat));
        assert_eq!(normalize(""), Err(FormatError::UnrecognizedFormat));
        assert_eq!(
            normalize(&"a".repeat(63)),
            Err(FormatError::UnrecognizedFormat)
        );
        assert_eq!(
            normalize(&"a".repeat(65)),
            Err(FormatError::UnrecognizedFormat)
        );
    }

    #[test]
    fn test_normalize_bad_checksum() {
        let mut bad = NPUB_STR.to_owned();
        let _ = bad.pop();
        bad.push('h');
        assert!(matches!(normalize(&bad), Err(FormatError::DecodeFailed(_))));
    }

    #[test]
    fn test_normalize_npub_prefixed_64_chars() {
        // Starts with npub, so it never falls through to the 64 character branch
        let input = format!("npub{}", "a".repeat(60));
        assert!(matches!(
            normalize(&input),
            Err(FormatError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_normalize_wrong_key_type() {
        let hrp = Hrp::parse("npubx").unwrap();
        let encoded = bech32::encode::<Bech32>(hrp, &[7; 32]).unwrap();
        assert_eq!(normalize(&encoded), Err(FormatError::WrongKeyType));
    }

    #[test]
    fn test_normalize_short_payload() {
        let encoded = bech32::encode::<Bech32>(NPUB, &[7; 20]).unwrap();
        assert!(matches!(
            normalize(&encoded),
            Err(FormatError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_bech32_of_non_hex_key() {
        let key = normalize(&"z".repeat(64)).unwrap();
        assert!(key.as_bech32_string().is_err());
    }
}
