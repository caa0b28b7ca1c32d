use futures_util::{SinkExt, StreamExt};
use nostr_zap_receipts::{
    Config, ConnectionError, ConnectionState, Event, Filter, PublicKeyHex, RelayPool, RelayUrl,
    Session,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tungstenite::protocol::Message;

const PAYEE: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

/// How the mock relay answers a REQ
#[derive(Clone)]
enum Reply {
    /// Send these events, then EOSE
    Events(Vec<Value>),
    /// Send these events and then go quiet
    EventsNoEose(Vec<Value>),
    /// Refuse with CLOSED
    Closed(&'static str),
}

fn receipt(id: &str, pubkey: &str) -> Value {
    json!({
        "id": id,
        "pubkey": "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        "created_at": 1_700_000_000,
        "kind": 9735,
        "tags": [["p", pubkey], ["e", "5c83da77af1dec6d7289834998ad7aafbd9e2191396d75ec3cc27f5a77226f36"]],
        "content": "",
        "sig": ""
    })
}

fn text_note(id: &str) -> Value {
    json!({
        "id": id,
        "pubkey": PAYEE,
        "created_at": 1_700_000_000,
        "kind": 1,
        "tags": [],
        "content": "hello",
        "sig": ""
    })
}

/// Start a relay on a free local port that answers every REQ with `reply`
async fn mock_relay(reply: Reply) -> RelayUrl {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let _ = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let reply = reply.clone();
            let _ = tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    let Ok(text) = message.to_text() else {
                        continue;
                    };
                    let Ok(Value::Array(parts)) = serde_json::from_str::<Value>(text) else {
                        continue;
                    };
                    if parts.first() != Some(&json!("REQ")) {
                        continue;
                    }
                    let sub_id = parts[1].clone();
                    let mut outgoing: Vec<Value> = Vec::new();
                    match &reply {
                        Reply::Events(events) => {
                            for e in events {
                                outgoing.push(json!(["EVENT", sub_id, e]));
                            }
                            outgoing.push(json!(["EOSE", sub_id]));
                        }
                        Reply::EventsNoEose(events) => {
                            for e in events {
                                outgoing.push(json!(["EVENT", sub_id, e]));
                            }
                        }
                        Reply::Closed(reason) => {
                            outgoing.push(json!(["CLOSED", sub_id, reason]));
                        }
                    }
                    for m in outgoing {
                        if ws.send(Message::text(m.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    RelayUrl::try_from_str(&format!("ws://{addr}")).unwrap()
}

/// A local address with nothing listening on it
async fn dead_relay() -> RelayUrl {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    RelayUrl::try_from_str(&format!("ws://{addr}")).unwrap()
}

fn payee() -> PublicKeyHex {
    nostr_zap_receipts::normalize(PAYEE).unwrap()
}

fn ids(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.id.as_str()).collect()
}

const SHORT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn fetches_receipts_until_eose() {
    let relay = mock_relay(Reply::Events(vec![
        receipt("a1", PAYEE),
        receipt("a2", PAYEE),
    ]))
    .await;

    let pool = RelayPool::connect(&[relay], SHORT, SHORT).await.unwrap();
    let events = pool
        .fetch_events(&Filter::zap_receipts_for(&payee()))
        .await
        .unwrap();
    assert_eq!(ids(&events), vec!["a1", "a2"]);
    pool.disconnect().await;
}

#[tokio::test]
async fn merges_relays_without_duplicates() {
    let one = mock_relay(Reply::Events(vec![
        receipt("a1", PAYEE),
        receipt("a2", PAYEE),
    ]))
    .await;
    let two = mock_relay(Reply::Events(vec![
        receipt("a2", PAYEE),
        receipt("a3", PAYEE),
        text_note("n1"),
    ]))
    .await;

    let pool = RelayPool::connect(&[one, two], SHORT, SHORT).await.unwrap();
    let events = pool
        .fetch_events(&Filter::zap_receipts_for(&payee()))
        .await
        .unwrap();
    assert_eq!(ids(&events), vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn quiet_relay_settles_after_query_timeout() {
    let relay = mock_relay(Reply::EventsNoEose(vec![receipt("q1", PAYEE)])).await;

    let pool = RelayPool::connect(&[relay], SHORT, Duration::from_secs(1))
        .await
        .unwrap();
    let events = pool
        .fetch_events(&Filter::zap_receipts_for(&payee()))
        .await
        .unwrap();
    assert_eq!(ids(&events), vec!["q1"]);
}

#[tokio::test]
async fn one_dead_relay_is_tolerated() {
    let live = mock_relay(Reply::Events(vec![receipt("a1", PAYEE)])).await;
    let dead = dead_relay().await;

    let pool = RelayPool::connect(&[dead, live.clone()], SHORT, SHORT)
        .await
        .unwrap();
    assert_eq!(pool.relays(), vec![&live]);
}

#[tokio::test]
async fn all_dead_relays_fail_to_connect() {
    let relays = vec![dead_relay().await, dead_relay().await];
    let result = RelayPool::connect(&relays, SHORT, SHORT).await;
    match result {
        Err(ConnectionError::AllRelaysFailed(failures)) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].0, relays[0]);
        }
        other => panic!("expected AllRelaysFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn closed_subscription_on_every_relay_is_an_error() {
    let relay = mock_relay(Reply::Closed("blocked: not allowed")).await;

    let pool = RelayPool::connect(&[relay], SHORT, SHORT).await.unwrap();
    let result = pool.fetch_events(&Filter::zap_receipts_for(&payee())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn session_end_to_end() {
    let relay = mock_relay(Reply::Events(vec![
        receipt("z1", PAYEE),
        receipt("other", "0000000000000000000000000000000000000000000000000000000000000001"),
    ]))
    .await;

    let session = Session::new(Config {
        relays: vec![relay],
        connect_timeout: SHORT,
        query_timeout: SHORT,
    });
    assert_eq!(session.state(), ConnectionState::Pending);
    let _ = session.initialize().await.unwrap();
    assert_eq!(session.state(), ConnectionState::Ready);

    let events = session
        .fetch_zapped_notes("npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg")
        .await
        .unwrap();
    assert_eq!(ids(&events), vec!["z1"]);

    let zap = events[0].zap_data().unwrap().unwrap();
    assert_eq!(zap.payee.as_str(), PAYEE);
    assert!(zap.amount.is_none());
}

#[tokio::test]
async fn session_with_no_reachable_relays_fails() {
    let session = Session::new(Config {
        relays: vec![dead_relay().await],
        connect_timeout: SHORT,
        query_timeout: SHORT,
    });
    assert!(session.initialize().await.is_err());
    assert!(matches!(session.state(), ConnectionState::Failed(_)));
    assert!(session.fetch_zapped_notes(PAYEE).await.is_err());
}
