//! Session registry: which users are online, on which connection, and which
//! group rooms they joined.

use std::collections::HashSet;
use std::time::Instant;

use dashmap::DashMap;

use parking_lot::Mutex;

/// Live-connection state for one authenticated user.
pub struct SessionEntry {
    pub conn_id: String,
    pub groups: HashSet<String>,
    pub last_active: Instant,
}

/// Bidirectional user ↔ connection map.
///
/// Uses `DashMap` for shard-level concurrency and `parking_lot::Mutex` per
/// entry for non-poisoning, fast locking. The forward (user → entry) map is
/// authoritative: last handshake wins, and a connection id resolves only
/// while the forward entry still points at it. A replaced connection is
/// thereby de-authenticated without being closed.
pub struct SessionRegistry {
    users: DashMap<String, Mutex<SessionEntry>>,
    conns: DashMap<String, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            conns: DashMap::new(),
        }
    }

    /// Register a connection after a successful handshake, replacing any
    /// previous connection for the same user.
    pub fn register(&self, user_id: &str, conn_id: &str) {
        let entry = SessionEntry {
            conn_id: conn_id.to_string(),
            groups: HashSet::new(),
            last_active: Instant::now(),
        };
        let previous = self.users.insert(user_id.to_string(), Mutex::new(entry));
        if let Some(previous) = previous {
            self.conns.remove(&previous.into_inner().conn_id);
        }
        self.conns.insert(conn_id.to_string(), user_id.to_string());
    }

    /// Remove a closing connection. Returns the user id and joined group set
    /// for offline fanout, or `None` when this connection was already
    /// replaced by a newer login (the user is still online elsewhere).
    pub fn unregister(&self, conn_id: &str) -> Option<(String, HashSet<String>)> {
        let (_, user_id) = self.conns.remove(conn_id)?;
        let (_, entry) = self
            .users
            .remove_if(&user_id, |_, entry| entry.lock().conn_id == conn_id)?;
        Some((user_id, entry.into_inner().groups))
    }

    /// Resolve the acting user for a connection. `None` when the connection
    /// never authenticated or was replaced.
    pub fn user_for_conn(&self, conn_id: &str) -> Option<String> {
        let user_id = self.conns.get(conn_id)?.value().clone();
        let entry = self.users.get(&user_id)?;
        if entry.lock().conn_id == conn_id {
            Some(user_id)
        } else {
            None
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn add_room(&self, user_id: &str, group_id: &str) {
        if let Some(entry) = self.users.get(user_id) {
            entry.lock().groups.insert(group_id.to_string());
        }
    }

    pub fn remove_room(&self, user_id: &str, group_id: &str) {
        if let Some(entry) = self.users.get(user_id) {
            entry.lock().groups.remove(group_id);
        }
    }

    /// The group rooms a user's live connection has joined.
    pub fn groups_of(&self, user_id: &str) -> Option<HashSet<String>> {
        let entry = self.users.get(user_id)?;
        let groups = entry.lock().groups.clone();
        Some(groups)
    }

    /// Refresh `last_active` for the connection's user, if it still resolves.
    pub fn touch(&self, conn_id: &str) {
        if let Some(user_id) = self.user_for_conn(conn_id) {
            if let Some(entry) = self.users.get(&user_id) {
                entry.lock().last_active = Instant::now();
            }
        }
    }

    pub fn online_count(&self) -> usize {
        self.users.len()
    }
}
