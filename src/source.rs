use crate::{ConnectionError, Error, Event, Filter, RelayUrl};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Something that can answer a filter with a settled set of events.
///
/// [`RelayPool`](crate::RelayPool) is the real one.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Fetch the events matching `filter`, returning once the source has settled
    async fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>, Error>;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Arc<S> {
    async fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>, Error> {
        (**self).fetch_events(filter).await
    }
}

/// Opens an [`EventSource`] over a list of relays
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Connect to the relays
    async fn connect(&self, relays: &[RelayUrl]) -> Result<ConnectionHandle, ConnectionError>;
}

/// A shared, read-only handle to the live relay connections
#[derive(Clone, Debug)]
pub struct ConnectionHandle(Arc<dyn EventSource>);

impl ConnectionHandle {
    /// Wrap an event source
    pub fn new<S: EventSource + 'static>(source: S) -> ConnectionHandle {
        ConnectionHandle(Arc::new(source))
    }

    /// The event source behind this handle
    pub fn source(&self) -> &dyn EventSource {
        self.0.as_ref()
    }
}
