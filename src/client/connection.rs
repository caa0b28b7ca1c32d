use crate::{ClientMessage, Error, Filter, RelayMessage, RelayUrl, SubscriptionId};
use base64::Engine;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tracing::{event, span, Instrument, Level};
use tungstenite::protocol::Message;

type Ws =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

// State written by the listener task and read by callers
#[derive(Debug, Default)]
struct Inbox {
    messages: RwLock<Vec<RelayMessage>>,

    // Only messages for these subscriptions are kept
    open: RwLock<HashSet<SubscriptionId>>,

    // Signalled when a message is stored or the socket goes away
    wake: Notify,

    closed: AtomicBool,
}

/// A live websocket to one relay.
///
/// Incoming messages are buffered by a background task until a caller takes
/// them with [`wait_for_relay_message`](ClientConnection::wait_for_relay_message).
/// Once the socket drops the connection stays dead; nothing reconnects it.
#[derive(Debug)]
pub struct ClientConnection {
    sink: Mutex<SplitSink<Ws, Message>>,
    inbox: Arc<Inbox>,
    next_sub_id: AtomicUsize,
}

impl ClientConnection {
    /// Open a websocket to the relay, giving up after `timeout`.
    pub async fn new(relay_url: &RelayUrl, timeout: Duration) -> Result<ClientConnection, Error> {
        let request = upgrade_request(relay_url)?;
        let (websocket, response) =
            tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request)).await??;

        let status = response.status();
        if status.is_redirection() || status.is_client_error() || status.is_server_error() {
            return Err(Error::WebsocketConnectionFailed(status));
        }

        let (sink, stream) = websocket.split();
        let inbox = Arc::new(Inbox::default());

        let span = span!(Level::DEBUG, "relay listener", relay = %relay_url);
        let _listener = tokio::task::spawn(listen(stream, inbox.clone()).instrument(span));

        Ok(ClientConnection {
            sink: Mutex::new(sink),
            inbox,
            next_sub_id: AtomicUsize::new(0),
        })
    }

    /// Whether the socket has gone away
    pub fn is_disconnected(&self) -> bool {
        self.inbox.closed.load(Ordering::Relaxed)
    }

    /// Send a websocket close and shut the sink, consuming self
    pub async fn disconnect(self) -> Result<(), Error> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(None)).await?;
        sink.close().await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_disconnected() {
            Err(Error::Disconnected)
        } else {
            Ok(())
        }
    }

    /// Send a REQ for `filter` under a fresh subscription id. This does not wait for results.
    pub async fn subscribe(&self, filter: Filter) -> Result<SubscriptionId, Error> {
        let n = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let sub_id = SubscriptionId(format!("zaps{n}"));
        let _ = self.inbox.open.write().await.insert(sub_id.clone());
        if let Err(e) = self
            .send_message(ClientMessage::Req(sub_id.clone(), vec![filter]))
            .await
        {
            let _ = self.inbox.open.write().await.remove(&sub_id);
            return Err(e);
        }
        Ok(sub_id)
    }

    /// Send a CLOSE, and drop anything buffered or still to come for the subscription
    pub async fn close_subscription(&self, sub_id: SubscriptionId) -> Result<(), Error> {
        {
            // Same lock order as the listener: messages, then open
            let mut messages = self.inbox.messages.write().await;
            let _ = self.inbox.open.write().await.remove(&sub_id);
            messages.retain(|rm| rm.subscription_id() != Some(&sub_id));
        }
        self.send_message(ClientMessage::Close(sub_id)).await
    }

    /// Send a `ClientMessage`. A failed write marks the connection dead.
    pub async fn send_message(&self, message: ClientMessage) -> Result<(), Error> {
        self.ensure_open()?;
        let wire = serde_json::to_string(&message)?;
        let result = self.sink.lock().await.send(Message::text(wire)).await;
        if let Err(e) = result {
            self.inbox.closed.store(true, Ordering::Relaxed);
            return Err(e.into());
        }
        Ok(())
    }

    /// Take the first buffered message matching `predicate`, waiting for one
    /// to arrive if needed.
    ///
    /// The timeout restarts whenever any message arrives, so the total wait
    /// can exceed it.
    pub async fn wait_for_relay_message<P>(
        &self,
        predicate: P,
        timeout: Duration,
    ) -> Result<RelayMessage, Error>
    where
        P: Fn(&RelayMessage) -> bool,
    {
        loop {
            // enable() before checking, so a wake in between is not lost
            let notified = self.inbox.wake.notified();
            tokio::pin!(notified);
            let _ = notified.as_mut().enable();

            {
                let mut messages = self.inbox.messages.write().await;
                if let Some(i) = messages.iter().position(&predicate) {
                    return Ok(messages.remove(i));
                }
            }

            self.ensure_open()?;
            tokio::time::timeout(timeout, notified).await?;
        }
    }

    #[cfg(test)]
    async fn buffered(&self) -> usize {
        self.inbox.messages.read().await.len()
    }
}

fn upgrade_request(relay_url: &RelayUrl) -> Result<http::Request<()>, Error> {
    let (host, uri) = super::url_to_host_and_uri(relay_url)?;
    let key: [u8; 16] = rand::random();
    let request = http::Request::builder()
        .method("GET")
        .header("Host", host)
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header(
            "Sec-WebSocket-Key",
            base64::engine::general_purpose::STANDARD.encode(key),
        )
        .uri(uri)
        .body(())?;
    Ok(request)
}

async fn listen(mut stream: SplitStream<Ws>, inbox: Arc<Inbox>) {
    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                event!(Level::DEBUG, "relay closed the websocket");
                break;
            }
            Ok(other) => {
                event!(Level::TRACE, "ignoring websocket frame: {other:?}");
                continue;
            }
            Err(e) => {
                event!(Level::ERROR, "{e}");
                break;
            }
        };

        match serde_json::from_str::<RelayMessage>(&text) {
            Ok(RelayMessage::Notice(notice)) => event!(Level::INFO, "NOTICE: {notice}"),
            Ok(RelayMessage::Auth(_)) => event!(Level::DEBUG, "AUTH challenge ignored"),
            Ok(rm) => {
                let mut messages = inbox.messages.write().await;
                let wanted = match rm.subscription_id() {
                    Some(id) => inbox.open.read().await.contains(id),
                    None => false,
                };
                if wanted {
                    messages.push(rm);
                    drop(messages);
                    inbox.wake.notify_waiters();
                } else {
                    event!(Level::TRACE, "dropping message for no open subscription");
                }
            }
            Err(e) => event!(Level::DEBUG, "unparseable relay message: {e}"),
        }
    }

    inbox.closed.store(true, Ordering::Relaxed);
    inbox.wake.notify_waiters();
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    // Answers REQ with EOSE, and CLOSE with CLOSED
    async fn chatty_relay() -> RelayUrl {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _ = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                let text = message.to_text().unwrap_or_default();
                let Ok(Value::Array(parts)) = serde_json::from_str::<Value>(text) else {
                    continue;
                };
                let reply = match parts.first().and_then(|v| v.as_str()) {
                    Some("REQ") => json!(["EOSE", parts[1]]),
                    Some("CLOSE") => json!(["CLOSED", parts[1], "closed by client"]),
                    _ => continue,
                };
                if ws.send(Message::text(reply.to_string())).await.is_err() {
                    return;
                }
            }
        });
        RelayUrl::try_from_str(&format!("ws://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_closed_subscriptions_leave_nothing_buffered() {
        let url = chatty_relay().await;
        let timeout = Duration::from_secs(2);
        let conn = ClientConnection::new(&url, timeout).await.unwrap();

        for _ in 0..50 {
            let sub_id = conn.subscribe(Filter::mock()).await.unwrap();
            let rm = conn
                .wait_for_relay_message(|rm| rm.subscription_id() == Some(&sub_id), timeout)
                .await
                .unwrap();
            assert!(matches!(rm, RelayMessage::Eose(_)));
            conn.close_subscription(sub_id).await.unwrap();
        }

        // Let the CLOSED replies arrive
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(conn.buffered().await, 0);
        assert!(!conn.is_disconnected());
    }

    #[test]
    fn test_upgrade_request() {
        let url = RelayUrl::try_from_str("wss://relay.example.com:4433/path").unwrap();
        let request = upgrade_request(&url).unwrap();
        assert_eq!(request.headers()["Host"], "relay.example.com:4433");
        assert_eq!(request.headers()["Upgrade"], "websocket");
        assert_eq!(request.uri().path(), "/path");
    }
}
