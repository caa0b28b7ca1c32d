use crate::client::RelayConnector;
use crate::{
    normalize, query_receipts, Config, ConnectionError, ConnectionHandle, Connector, Event,
    FetchError, PublicKeyHex, QueryError,
};
use std::fmt;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Where the relay connections are in their lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet connected (initialization not started, or in progress)
    Pending,

    /// Connected, queries may be issued
    Ready,

    /// Initialization failed. This is terminal for the session.
    Failed(ConnectionError),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Pending => write!(f, "pending"),
            ConnectionState::Ready => write!(f, "ready"),
            ConnectionState::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// One user session: connects to the configured relays once, then serves queries
/// over that single connection handle.
#[derive(Debug)]
pub struct Session {
    config: Config,
    connector: Box<dyn Connector>,
    connection: OnceCell<Result<ConnectionHandle, ConnectionError>>,
}

impl Session {
    /// A session that will connect with a [`RelayConnector`] using the config's timeouts
    pub fn new(config: Config) -> Session {
        let connector = RelayConnector {
            connect_timeout: config.connect_timeout,
            query_timeout: config.query_timeout,
        };
        Session::with_connector(config, connector)
    }

    /// A session that will connect with the given connector
    pub fn with_connector<C: Connector + 'static>(config: Config, connector: C) -> Session {
        Session {
            config,
            connector: Box::new(connector),
            connection: OnceCell::new(),
        }
    }

    /// The session's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect to the relays.
    ///
    /// The connector runs at most once per session; every call (including
    /// concurrent ones) gets the outcome of that one attempt. A failure is
    /// never retried.
    pub async fn initialize(&self) -> Result<ConnectionHandle, ConnectionError> {
        self.connection
            .get_or_init(|| async {
                info!("connecting to {} relays", self.config.relays.len());
                let result = self.connector.connect(&self.config.relays).await;
                if let Err(ref e) = result {
                    error!("relay initialization failed: {e}");
                }
                result
            })
            .await
            .clone()
    }

    /// The current lifecycle state
    pub fn state(&self) -> ConnectionState {
        match self.connection.get() {
            None => ConnectionState::Pending,
            Some(Ok(_)) => ConnectionState::Ready,
            Some(Err(e)) => ConnectionState::Failed(e.clone()),
        }
    }

    /// The connection handle, if the session is Ready
    pub fn handle(&self) -> Result<&ConnectionHandle, QueryError> {
        match self.connection.get() {
            Some(Ok(handle)) => Ok(handle),
            _ => Err(QueryError::NotReady(self.state())),
        }
    }

    /// Query zap receipts for an already normalized key.
    ///
    /// Fails immediately, without touching the network, unless the session is Ready.
    pub async fn query_receipts(&self, key: &PublicKeyHex) -> Result<Vec<Event>, QueryError> {
        let handle = self.handle()?;
        query_receipts(handle, key).await
    }

    /// The whole user action: check readiness, normalize the input, then query.
    pub async fn fetch_zapped_notes(&self, input: &str) -> Result<Vec<Event>, FetchError> {
        let handle = self.handle()?;
        let key = normalize(input)?;
        Ok(query_receipts(handle, &key).await?)
    }
}
