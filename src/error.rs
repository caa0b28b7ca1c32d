use crate::{ConnectionState, RelayUrl};
use thiserror::Error;

/// Errors that can occur in the nostr-zap-receipts crate
#[derive(Error, Debug)]
pub enum Error {
    /// Bech32 decode error
    #[error("Bech32 Error: {0}")]
    Bech32Decode(#[from] bech32::DecodeError),

    /// Bech32 encode error
    #[error("Bech32 Error: {0}")]
    Bech32Encode(#[from] bech32::EncodeError),

    /// Disconnected
    #[error("Disconnected")]
    Disconnected,

    /// Hex string decoding error
    #[error("Hex Decode Error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// HTTP error
    #[error("HTTP: {0}")]
    Http(#[from] http::Error),

    /// Invalid config value
    #[error("Invalid config value for {0}: {1}")]
    InvalidConfig(&'static str, String),

    /// Invalid public key
    #[error("Invalid Public Key")]
    InvalidPublicKey,

    /// Invalid URL
    #[error("Invalid URL: \"{0}\"")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid URI
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// Invalid URL Scheme
    #[error("Invalid URL Scheme: \"{0}\"")]
    InvalidUrlScheme(String),

    /// Missing URL Host
    #[error("Missing URL Host")]
    InvalidUrlMissingHost,

    /// Relay closed the subscription
    #[error("Relay closed the subscription: {0}")]
    SubscriptionClosed(String),

    /// Serialization error
    #[error("JSON (de)serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Timeout
    #[error("Timeout: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// Url Error
    #[error("Not a valid nostr relay url: {0}")]
    Url(String),

    /// Websocket error
    #[error("Websocket error: {0}")]
    Websocket(#[from] tungstenite::Error),

    /// Websocket Connection Failed
    #[error("Websocket connection failed: {0}")]
    WebsocketConnectionFailed(http::StatusCode),

    /// Zap Receipt issue
    #[error("Invalid Zap Receipt: {0}")]
    ZapReceipt(String),
}

/// Why a public key input could not be normalized
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// Neither an `npub` nor a 64 character string
    #[error("Invalid public key format. Please use npub or hex.")]
    UnrecognizedFormat,

    /// The `npub` failed to decode
    #[error("Error decoding public key: {0}")]
    DecodeFailed(String),

    /// Decoded, but not as a public key
    #[error("Invalid npub key.")]
    WrongKeyType,
}

/// The relay connections could not be established. Terminal for the session.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionError {
    /// No relays were configured
    #[error("No relays configured")]
    NoRelays,

    /// Every relay failed to connect
    #[error("Failed to connect to any relay: {}", describe_failures(.0))]
    AllRelaysFailed(Vec<(RelayUrl, String)>),
}

fn describe_failures(failures: &[(RelayUrl, String)]) -> String {
    failures
        .iter()
        .map(|(url, why)| format!("{url} ({why})"))
        .collect::<Vec<String>>()
        .join(", ")
}

/// A zap receipt query failed
#[derive(Error, Debug)]
pub enum QueryError {
    /// The session has not reached the Ready state
    #[error("Relay connection not ready ({0}). Please wait and try again.")]
    NotReady(ConnectionState),

    /// Transport or protocol failure
    #[error("Failed to fetch data from relays: {0}")]
    Relay(#[source] Error),
}

/// Any failure of the combined normalize-then-query user action
#[derive(Error, Debug)]
pub enum FetchError {
    /// Bad public key input
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The query failed
    #[error(transparent)]
    Query(#[from] QueryError),
}
