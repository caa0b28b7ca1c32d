// Copyright 2015-2020 nostr-proto Developers
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according to those terms.

//! This crate looks up the notes a nostr user has been zapped for.
//!
//! A [`Session`] connects once to a fixed set of relays, then answers queries for
//! zap receipts (kind 9735 events) that tag a given public key. Keys may be
//! given as `npub` bech32 strings or as 64 character hex.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_results,
    unused_lifetimes,
    unused_labels,
    unused_extern_crates,
    non_ascii_idents,
    keyword_idents,
    unstable_features,
    //unsafe_code,
    unreachable_pub,
    missing_docs
)]
#![deny(clippy::string_slice)]

mod error;
pub use error::{ConnectionError, Error, FetchError, FormatError, QueryError};

#[cfg(test)]
macro_rules! test_serde {
    ($t:ty, $fnname:ident) => {
        #[test]
        fn $fnname() {
            let a = <$t>::mock();
            let x = serde_json::to_string(&a).unwrap();
            println!("{}", x);
            let b = serde_json::from_str(&x).unwrap();
            assert_eq!(a, b);
        }
    };
}

mod types;
pub use types::{
    normalize, ClientMessage, Event, EventKind, Filter, IdHex, MilliSatoshi, PublicKeyHex,
    RelayMessage, RelayUrl, SubscriptionId, Tag, Unixtime, ZapData,
};

mod client;
pub use client::{Client, ClientConnection, RelayConnector, RelayPool};

mod config;
pub use config::{
    parse_relay_list, Config, DEFAULT_RELAYS, ENV_CONNECT_TIMEOUT, ENV_QUERY_TIMEOUT, ENV_RELAYS,
};

mod query;
pub use query::query_receipts;

mod session;
pub use session::{ConnectionState, Session};

mod source;
pub use source::{ConnectionHandle, Connector, EventSource};
