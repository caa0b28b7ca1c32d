use super::Client;
use crate::{
    ConnectionError, ConnectionHandle, Connector, Error, Event, EventSource, Filter, IdHex,
    RelayUrl,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// A set of connected relays, queried together.
///
/// Only relays that connected at startup are members. Nothing is reconnected.
#[derive(Debug)]
pub struct RelayPool {
    clients: Vec<Client>,
    query_timeout: Duration,
}

impl RelayPool {
    /// Connect to all relays at once.
    ///
    /// Succeeds if at least one relay connects; the rest are logged and dropped.
    pub async fn connect(
        relays: &[RelayUrl],
        connect_timeout: Duration,
        query_timeout: Duration,
    ) -> Result<RelayPool, ConnectionError> {
        if relays.is_empty() {
            return Err(ConnectionError::NoRelays);
        }

        let attempts = relays.iter().map(|url| async move {
            let client = Client::new(url.clone());
            let result = client.connect(connect_timeout).await;
            (client, result)
        });

        let mut clients: Vec<Client> = Vec::with_capacity(relays.len());
        let mut failures: Vec<(RelayUrl, String)> = Vec::new();
        for (client, result) in join_all(attempts).await {
            match result {
                Ok(()) => {
                    info!("connected to {}", client.relay_url());
                    clients.push(client);
                }
                Err(e) => {
                    warn!("failed to connect to {}: {e}", client.relay_url());
                    failures.push((client.relay_url().clone(), e.to_string()));
                }
            }
        }

        if clients.is_empty() {
            Err(ConnectionError::AllRelaysFailed(failures))
        } else {
            Ok(RelayPool {
                clients,
                query_timeout,
            })
        }
    }

    /// The relays in the pool, in configuration order
    pub fn relays(&self) -> Vec<&RelayUrl> {
        self.clients.iter().map(|c| c.relay_url()).collect()
    }

    /// Fetch from every relay at once and merge the settled results
    pub async fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>, Error> {
        let fetches = self.clients.iter().map(|client| async move {
            let result = client
                .fetch_events(filter.clone(), self.query_timeout)
                .await;
            (client.relay_url().clone(), result)
        });
        let settled = join_all(fetches).await;
        merge_settled(settled, filter)
    }

    /// Disconnect from every relay
    pub async fn disconnect(&self) {
        for client in &self.clients {
            if let Err(e) = client.disconnect().await {
                warn!("error disconnecting from {}: {e}", client.relay_url());
            }
        }
    }
}

#[async_trait]
impl EventSource for RelayPool {
    async fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>, Error> {
        RelayPool::fetch_events(self, filter).await
    }
}

/// Merge per-relay results in relay order, keeping the first copy of each event id
/// and only events that match the filter.
///
/// Fails only if every relay failed, with the first relay's error.
fn merge_settled(
    settled: Vec<(RelayUrl, Result<Vec<Event>, Error>)>,
    filter: &Filter,
) -> Result<Vec<Event>, Error> {
    let mut seen: HashSet<IdHex> = HashSet::new();
    let mut output: Vec<Event> = Vec::new();
    let mut first_error: Option<Error> = None;
    let mut any_ok = false;

    for (url, result) in settled {
        match result {
            Ok(events) => {
                any_ok = true;
                for event in events {
                    if !filter.event_matches(&event) {
                        warn!("{url} sent an event that does not match the filter: {}", event.id);
                        continue;
                    }
                    if seen.insert(event.id.clone()) {
                        output.push(event);
                    }
                }
            }
            Err(e) => {
                warn!("query to {url} failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match (any_ok, first_error) {
        (false, Some(e)) => Err(e),
        _ => Ok(output),
    }
}

/// Connects a [`RelayPool`]
#[derive(Clone, Copy, Debug)]
pub struct RelayConnector {
    /// How long to wait for each relay's websocket handshake
    pub connect_timeout: Duration,

    /// How long a relay may stay quiet before its results are considered settled
    pub query_timeout: Duration,
}

#[async_trait]
impl Connector for RelayConnector {
    async fn connect(&self, relays: &[RelayUrl]) -> Result<ConnectionHandle, ConnectionError> {
        let pool = RelayPool::connect(relays, self.connect_timeout, self.query_timeout).await?;
        Ok(ConnectionHandle::new(pool))
    }
}
