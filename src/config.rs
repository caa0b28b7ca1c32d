use crate::{Error, RelayUrl};
use std::time::Duration;

/// The relays queried when nothing else is configured
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://relay.snort.social",
    "wss://nostr.wine",
];

/// Environment variable holding a comma separated relay list
pub const ENV_RELAYS: &str = "ZAP_RELAYS";

/// Environment variable holding the connect timeout, in seconds
pub const ENV_CONNECT_TIMEOUT: &str = "ZAP_CONNECT_TIMEOUT_SECS";

/// Environment variable holding the query timeout, in seconds
pub const ENV_QUERY_TIMEOUT: &str = "ZAP_QUERY_TIMEOUT_SECS";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Relays to connect to at startup
    pub relays: Vec<RelayUrl>,

    /// How long to wait for each relay to accept the websocket
    pub connect_timeout: Duration,

    /// How long a relay may stay quiet during a query before it is considered settled
    pub query_timeout: Duration,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            relays: DEFAULT_RELAYS
                .iter()
                .filter_map(|u| RelayUrl::try_from_str(u).ok())
                .collect(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl Config {
    /// Load settings from the process environment, defaulting anything unset
    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through a lookup function, defaulting anything it does not supply
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(list) = lookup(ENV_RELAYS).filter(|s| !s.trim().is_empty()) {
            config.relays = parse_relay_list(&list)?;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT, &secs)?;
        }
        if let Some(secs) = lookup(ENV_QUERY_TIMEOUT) {
            config.query_timeout = parse_secs(ENV_QUERY_TIMEOUT, &secs)?;
        }

        Ok(config)
    }
}

/// Parse a comma separated list of relay URLs, skipping empty entries
pub fn parse_relay_list(list: &str) -> Result<Vec<RelayUrl>, Error> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RelayUrl::try_from_str)
        .collect()
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration, Error> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(Error::InvalidConfig(name, "must be at least 1".to_owned())),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(Error::InvalidConfig(name, e.to_string())),
    }
}
