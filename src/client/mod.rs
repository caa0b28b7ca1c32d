use crate::{Error, Event, Filter, RelayMessage, RelayUrl, SubscriptionId};
use http::Uri;
use std::ops::DerefMut;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

mod connection;
pub use connection::ClientConnection;

mod pool;
pub use pool::{RelayConnector, RelayPool};

/// A client connection to a single relay.
#[derive(Debug)]
pub struct Client {
    // read-only URL of the remote relay
    relay_url: RelayUrl,

    // The connection information
    // We only write-lock this to create or disconnect. Normal operations are
    // read-locked with multiple readers allowed at once.
    connection: RwLock<Option<ClientConnection>>,
}

impl Client {
    /// Create a client for a relay. This does not connect.
    pub fn new(relay_url: RelayUrl) -> Client {
        Client {
            relay_url,
            connection: RwLock::new(None),
        }
    }

    /// The relay this client talks to
    pub fn relay_url(&self) -> &RelayUrl {
        &self.relay_url
    }

    /// Connect to the relay, unless a connection already exists.
    ///
    /// A connection that has dropped is not replaced.
    pub async fn connect(&self, timeout: Duration) -> Result<(), Error> {
        let mut lock = self.connection.write().await;
        if lock.is_none() {
            let cc = ClientConnection::new(&self.relay_url, timeout).await?;
            *lock = Some(cc);
        }
        Ok(())
    }

    /// Disconnect from the relay
    pub async fn disconnect(&self) -> Result<(), Error> {
        let cc = std::mem::take(self.connection.write().await.deref_mut());
        if let Some(cc) = cc {
            cc.disconnect().await?
        }
        Ok(())
    }

    /// Subscribe to a filter. This does not wait for results.
    pub async fn subscribe(&self, filter: Filter) -> Result<SubscriptionId, Error> {
        let lock = self.connection.read().await;
        let Some(ref cc) = *lock else {
            return Err(Error::Disconnected);
        };
        cc.subscribe(filter).await
    }

    /// Close a subscription
    pub async fn close_subscription(&self, sub_id: SubscriptionId) -> Result<(), Error> {
        let lock = self.connection.read().await;
        let Some(ref cc) = *lock else {
            return Err(Error::Disconnected);
        };
        cc.close_subscription(sub_id).await
    }

    /// Subscribe and collect all results until the relay settles, then close
    /// the subscription.
    ///
    /// The relay has settled when it sends EOSE or CLOSED, or when `timeout`
    /// passes without any message for the subscription. A CLOSED before any
    /// event arrives is reported as an error.
    pub async fn fetch_events(&self, filter: Filter, timeout: Duration) -> Result<Vec<Event>, Error> {
        let mut output: Vec<Event> = Vec::new();

        let sub_id = self.subscribe(filter).await?;

        let lock = self.connection.read().await;
        let Some(ref cc) = *lock else {
            return Err(Error::Disconnected);
        };

        let result = loop {
            // Wait for any of EVENT or EOSE or CLOSED on this subscription_id
            let rm = cc
                .wait_for_relay_message(|rm| rm.subscription_id() == Some(&sub_id), timeout)
                .await;

            match rm {
                Ok(RelayMessage::Event(_, event)) => output.push(*event),
                Ok(RelayMessage::Eose(_)) => {
                    debug!("{}: EOSE after {} events", self.relay_url, output.len());
                    break Ok(output);
                }
                Ok(RelayMessage::Closed(_, message)) => {
                    if output.is_empty() {
                        break Err(Error::SubscriptionClosed(message));
                    }
                    warn!("{}: subscription closed early: {message}", self.relay_url);
                    break Ok(output);
                }
                Ok(_) => continue,
                Err(Error::Timeout(_)) => {
                    debug!(
                        "{}: quiet for {:?}, settling with {} events",
                        self.relay_url,
                        timeout,
                        output.len()
                    );
                    break Ok(output);
                }
                Err(e) => break Err(e),
            }
        };

        if !cc.is_disconnected() {
            if let Err(e) = cc.close_subscription(sub_id).await {
                debug!("{}: failed to close subscription: {e}", self.relay_url);
            }
        }

        result
    }
}

fn url_to_host_and_uri(url: &RelayUrl) -> Result<(String, Uri), Error> {
    let uri: http::Uri = url.as_str().parse::<http::Uri>()?;
    let authority = match uri.authority() {
        Some(auth) => auth.as_str(),
        None => return Err(Error::Url(url.to_string())),
    };
    let host = authority
        .find('@')
        .map(|idx| authority.split_at(idx + 1).1)
        .unwrap_or(authority);
    if host.is_empty() {
        Err(Error::Url(url.to_string()))
    } else {
        Ok((host.to_owned(), uri))
    }
}
