use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use zikr_api::config::Config;
use zikr_api::gateway::broadcast::GatewayBroadcast;
use zikr_api::gateway::limiter::RateLimiter;
use zikr_api::gateway::registry::SessionRegistry;
use zikr_api::store::{MemoryStore, Store};
use zikr_api::AppState;

pub const TEST_SECRET: &str = "test-secret-do-not-use-in-production";

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Serialize)]
struct TestClaims {
    id: String,
    role: String,
    iat: i64,
    exp: i64,
}

fn encode_claims(claims: &TestClaims) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("mint token")
}

/// Mint an HS256 access token the gateway handshake accepts.
pub fn mint_token(user_id: &str) -> String {
    let now = chrono::Utc::now();
    encode_claims(&TestClaims {
        id: user_id.to_string(),
        role: "USER".to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::seconds(300)).timestamp(),
    })
}

/// Mint an already-expired token.
pub fn mint_expired_token(user_id: &str) -> String {
    let now = chrono::Utc::now();
    encode_claims(&TestClaims {
        id: user_id.to_string(),
        role: "USER".to_string(),
        iat: (now - chrono::Duration::seconds(600)).timestamp(),
        exp: (now - chrono::Duration::seconds(300)).timestamp(),
    })
}

/// Build a test AppState over an empty in-memory store.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let store_dyn: Arc<dyn Store> = store.clone();

    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        port: 0,
    };

    let state = AppState {
        store: store_dyn,
        sessions: Arc::new(SessionRegistry::new()),
        broadcast: Arc::new(GatewayBroadcast::new()),
        limiter: Arc::new(RateLimiter::new()),
        config: Arc::new(config),
    };

    (state, store)
}

/// Start the app on an ephemeral port. The server runs in the background.
pub async fn start_server() -> (SocketAddr, AppState, Arc<MemoryStore>) {
    let (state, store) = test_state();
    let app = zikr_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state, store)
}

/// Open a WebSocket to the gateway without consuming any frames.
pub async fn connect_raw(addr: SocketAddr, token: Option<&str>) -> WsClient {
    let url = match token {
        Some(token) => format!("ws://{addr}/zikr-app?token={token}"),
        None => format!("ws://{addr}/zikr-app"),
    };
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

/// Connect with a token and consume the `connection_status` handshake event.
pub async fn connect(addr: SocketAddr, token: &str) -> WsClient {
    let mut ws = connect_raw(addr, Some(token)).await;
    let frame = recv_frame(&mut ws).await;
    assert_eq!(frame["event"], "connection_status");
    assert_eq!(frame["data"]["status"], "connected");
    ws
}

/// Send one `{event, data}` frame.
pub async fn send_event(ws: &mut WsClient, event: &str, data: serde_json::Value) {
    let frame = serde_json::json!({ "event": event, "data": data });
    ws.send(tungstenite::Message::Text(frame.to_string().into()))
        .await
        .expect("send event");
}

/// Receive the next text frame as JSON.
pub async fn recv_frame(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse event");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Receive frames until one carries the given event name, returning its
/// data. An `error` frame along the way fails the test immediately.
pub async fn recv_named(ws: &mut WsClient, event: &str) -> serde_json::Value {
    for _ in 0..10 {
        let frame = recv_frame(ws).await;
        if frame["event"] == event {
            return frame["data"].clone();
        }
        if frame["event"] == "error" {
            panic!("expected {event}, got error: {}", frame["data"]);
        }
    }
    panic!("event {event} not received");
}

/// Receive frames until an `error` event arrives, returning its data.
pub async fn recv_error(ws: &mut WsClient) -> serde_json::Value {
    for _ in 0..10 {
        let frame = recv_frame(ws).await;
        if frame["event"] == "error" {
            return frame["data"].clone();
        }
    }
    panic!("error event not received");
}

/// Receive frames until the server closes the socket.
pub async fn recv_close(ws: &mut WsClient) {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for close");
        match msg {
            Some(Ok(tungstenite::Message::Close(_))) | Some(Err(_)) | None => return,
            Some(Ok(_)) => continue,
        }
    }
}

/// Assert that nothing arrives on this socket within a short window.
pub async fn assert_silent(ws: &mut WsClient) {
    let result = time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}
