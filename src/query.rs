use crate::{ConnectionHandle, Event, Filter, PublicKeyHex, QueryError};
use tracing::debug;

/// Fetch the zap receipts (kind 9735) that tag `key`, from every relay behind `conn`.
///
/// The order is the order in which events were first seen, not time order.
/// An empty result is a success.
pub async fn query_receipts(
    conn: &ConnectionHandle,
    key: &PublicKeyHex,
) -> Result<Vec<Event>, QueryError> {
    let filter = Filter::zap_receipts_for(key);
    debug!("querying zap receipts for {key}");
    let events = conn
        .source()
        .fetch_events(&filter)
        .await
        .map_err(QueryError::Relay)?;
    debug!("{} zap receipts for {key}", events.len());
    Ok(events)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Error, EventSource};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recording {
        events: Vec<Event>,
        fail: bool,
        seen: Mutex<Vec<Filter>>,
    }

    #[async_trait]
    impl EventSource for Recording {
        async fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>, Error> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(filter.clone());
            }
            if self.fail {
                Err(Error::Disconnected)
            } else {
                Ok(self.events.clone())
            }
        }
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let conn = ConnectionHandle::new(Recording::default());
        let events = query_receipts(&conn, &PublicKeyHex::mock()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_query_uses_zap_filter() {
        let source = std::sync::Arc::new(Recording {
            events: vec![Event::mock()],
            ..Default::default()
        });
        let conn = ConnectionHandle::new(source.clone());
        let events = query_receipts(&conn, &PublicKeyHex::mock()).await.unwrap();
        assert_eq!(events, vec![Event::mock()]);

        let seen = source.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], Filter::zap_receipts_for(&PublicKeyHex::mock()));
    }

    #[tokio::test]
    async fn test_transport_failure_is_query_error() {
        let conn = ConnectionHandle::new(Recording {
            fail: true,
            ..Default::default()
        });
        let result = query_receipts(&conn, &PublicKeyHex::mock()).await;
        assert!(matches!(result, Err(QueryError::Relay(Error::Disconnected))));
    }
}
