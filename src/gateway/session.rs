//! Per-connection gateway session state.

use std::collections::HashSet;

use super::broadcast::{BroadcastPayload, Room};

/// State for a single authenticated WebSocket connection.
///
/// The room set is owned by the connection task; only its own handlers
/// mutate it, so no locking is needed. The user room is joined at handshake
/// and never left.
pub struct ConnectionSession {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub conn_id: String,
    /// Authenticated user ID (verified once, at handshake).
    pub user_id: String,
    rooms: HashSet<Room>,
}

impl ConnectionSession {
    pub fn new(conn_id: String, user_id: String) -> Self {
        let mut rooms = HashSet::new();
        rooms.insert(Room::user(user_id.clone()));
        Self {
            conn_id,
            user_id,
            rooms,
        }
    }

    pub fn join(&mut self, room: Room) {
        self.rooms.insert(room);
    }

    pub fn leave(&mut self, room: &Room) {
        self.rooms.remove(room);
    }

    pub fn in_room(&self, room: &Room) -> bool {
        self.rooms.contains(room)
    }

    /// Group rooms this connection joined, for offline fanout on disconnect.
    pub fn group_rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().filter_map(|room| match room {
            Room::Group(id) => Some(id.as_str()),
            Room::User(_) => None,
        })
    }

    /// Whether a broadcast payload should be written to this connection.
    pub fn should_receive(&self, payload: &BroadcastPayload) -> bool {
        if payload.except.as_deref() == Some(self.conn_id.as_str()) {
            return false;
        }
        self.rooms.contains(&payload.room)
    }
}
