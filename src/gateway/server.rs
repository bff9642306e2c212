//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use crate::auth;
use crate::error::GatewayError;
use crate::id::{self, prefix};
use crate::AppState;

use super::broadcast::{BroadcastPayload, Room};
use super::events::{ClientMessage, EventName, ServerMessage};
use super::handlers;
use super::session::ConnectionSession;

/// Close code sent when the handshake is rejected.
const CLOSE_POLICY_VIOLATION: u16 = 1008;

pub fn router() -> Router<AppState> {
    Router::new().route("/zikr-app", get(ws_upgrade))
}

#[derive(Deserialize)]
struct WsQuery {
    token: Option<String>,
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let token = query.token.or_else(|| bearer_token(&headers));
    ws.on_upgrade(move |socket| handle_connection(socket, state, token))
}

/// Token from an `Authorization: Bearer …` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    value.strip_prefix("Bearer ").map(|token| token.to_string())
}

async fn handle_connection(socket: WebSocket, state: AppState, token: Option<String>) {
    let (mut ws_tx, ws_rx) = socket.split();

    // Handshake: verify the token once, before any registry state exists.
    // Pipelined action frames on a rejected connection are never processed.
    let token = match token {
        Some(token) => token,
        None => {
            let error = GatewayError::unauthenticated("Authentication token required");
            let _ = send_message(
                &mut ws_tx,
                &ServerMessage::new(EventName::ERROR, error.payload()),
            )
            .await;
            let _ = send_close(&mut ws_tx, "Authentication token required").await;
            return;
        }
    };

    let claims = match auth::verify_token(&state.config.jwt_secret, &token) {
        Ok(claims) => claims,
        Err(error) => {
            let _ = send_message(
                &mut ws_tx,
                &ServerMessage::new(EventName::ERROR, error.payload()),
            )
            .await;
            let _ = send_close(&mut ws_tx, "Invalid authentication token").await;
            return;
        }
    };

    let conn_id = id::prefixed_ulid(prefix::CONNECTION);
    let user_id = claims.id;

    // Subscribe before registering so nothing published after the handshake
    // lands between the two.
    let broadcast_rx = state.broadcast.subscribe();
    state.sessions.register(&user_id, &conn_id);
    let mut session = ConnectionSession::new(conn_id.clone(), user_id.clone());

    let connected = ServerMessage::new(
        EventName::CONNECTION_STATUS,
        json!({
            "status": "connected",
            "userId": user_id,
            "timestamp": Utc::now(),
        }),
    );
    if send_message(&mut ws_tx, &connected).await.is_err() {
        state.sessions.unregister(&conn_id);
        return;
    }

    tracing::info!(conn_id = %conn_id, user_id = %user_id, "gateway connection established");

    run_connection(&state, &mut session, &mut ws_tx, ws_rx, broadcast_rx).await;

    // Presence fanout only while this connection still owns the user's
    // registry entry; one replaced by a newer login purges nothing and
    // emits nothing.
    if let Some((user_id, groups)) = state.sessions.unregister(&conn_id) {
        for group_id in &groups {
            state.broadcast.send_to_room(
                Room::group(group_id.clone()),
                ServerMessage::new(
                    EventName::USER_OFFLINE,
                    json!({
                        "groupId": group_id,
                        "userId": user_id,
                        "timestamp": Utc::now(),
                    }),
                ),
            );
        }
    }

    tracing::info!(conn_id = %conn_id, "gateway connection closed");
}

/// Main connection loop: handle client frames, forward matching broadcasts.
async fn run_connection(
    state: &AppState,
    session: &mut ConnectionSession,
    ws_tx: &mut SplitSink<WebSocket, Message>,
    mut ws_rx: SplitStream<WebSocket>,
    mut broadcast_rx: broadcast::Receiver<Arc<BroadcastPayload>>,
) {
    loop {
        tokio::select! {
            // Client sends us a frame.
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => dispatch(state, session, message).await,
                            Err(_) => Err(GatewayError::unknown("Invalid message format")),
                        };
                        let message = match reply {
                            Ok(message) => message,
                            Err(error) => {
                                tracing::debug!(
                                    conn_id = %session.conn_id,
                                    code = error.code,
                                    "action rejected"
                                );
                                ServerMessage::new(EventName::ERROR, error.payload())
                            }
                        };
                        if send_message(ws_tx, &message).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(?err, conn_id = %session.conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Event from the broadcast hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if !session.should_receive(&payload) {
                            continue;
                        }
                        if send_message(ws_tx, &payload.message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            conn_id = %session.conn_id,
                            skipped,
                            "connection lagged behind broadcast"
                        );
                        // Continue — the missed events are dropped.
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Route one inbound message to its handler. Messages from one connection
/// are handled serially, in arrival order.
async fn dispatch(
    state: &AppState,
    session: &mut ConnectionSession,
    message: ClientMessage,
) -> Result<ServerMessage, GatewayError> {
    match message.event.as_str() {
        EventName::JOIN_GROUP => {
            handlers::rooms::join_group(state, session, parse(message.data)?).await
        }
        EventName::LEAVE_GROUP => {
            handlers::rooms::leave_group(state, session, parse(message.data)?).await
        }
        EventName::BOOK_PORA => {
            handlers::bookings::book_pora(state, session, parse(message.data)?).await
        }
        EventName::COMPLETE_PORA => {
            handlers::bookings::complete_pora(state, session, parse(message.data)?).await
        }
        EventName::UPDATE_ZIKR_COUNT => {
            handlers::zikr::update_zikr_count(state, session, parse(message.data)?).await
        }
        EventName::SEND_INVITATION => {
            handlers::invitations::send_invitation(state, session, parse(message.data)?).await
        }
        EventName::RESPOND_TO_INVITATION => {
            handlers::invitations::respond_to_invitation(state, session, parse(message.data)?)
                .await
        }
        EventName::GET_NOTIFICATIONS => {
            handlers::notifications::get_notifications(state, session).await
        }
        EventName::MARK_NOTIFICATION_READ => {
            handlers::notifications::mark_notification_read(state, session, parse(message.data)?)
                .await
        }
        EventName::PING => {
            state.sessions.touch(&session.conn_id);
            Ok(ServerMessage::new(
                EventName::PONG,
                json!({ "timestamp": Utc::now() }),
            ))
        }
        other => Err(GatewayError::unknown(format!("Unknown event: {other}"))),
    }
}

/// Decode an action payload; malformed data rejects the action but keeps
/// the connection open.
fn parse<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|_| GatewayError::unknown("Invalid payload"))
}

async fn send_message(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).unwrap();
    ws_tx.send(Message::Text(json.into())).await
}

/// Send a WebSocket close frame with a reason.
async fn send_close(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    reason: &str,
) -> Result<(), axum::Error> {
    let close = Message::Close(Some(CloseFrame {
        code: CLOSE_POLICY_VIOLATION,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close).await
}
