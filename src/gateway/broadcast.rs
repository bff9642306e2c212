//! Broadcast hub for dispatching events to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connected session
//! subscribes and filters payloads locally against its own room set, so the
//! hub itself never tracks membership and stays transport-independent.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::events::ServerMessage;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// Addressing label for delivery. Rooms are names, not allocations: nothing
/// is created by joining one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Group(String),
    User(String),
}

impl Room {
    pub fn group(id: impl Into<String>) -> Self {
        Room::Group(id.into())
    }

    pub fn user(id: impl Into<String>) -> Self {
        Room::User(id.into())
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Group(id) => write!(f, "group:{id}"),
            Room::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// A payload broadcast to all connected gateway sessions.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    pub room: Room,
    /// Connection to skip, for room sends that exclude the acting one.
    pub except: Option<String>,
    pub message: ServerMessage,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway session should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    pub fn send_to_room(&self, room: Room, message: ServerMessage) {
        self.dispatch(BroadcastPayload {
            room,
            except: None,
            message,
        });
    }

    pub fn send_to_room_except(&self, room: Room, conn_id: &str, message: ServerMessage) {
        self.dispatch(BroadcastPayload {
            room,
            except: Some(conn_id.to_string()),
            message,
        });
    }

    pub fn send_to_user(&self, user_id: &str, message: ServerMessage) {
        self.dispatch(BroadcastPayload {
            room: Room::user(user_id),
            except: None,
            message,
        });
    }

    fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}
