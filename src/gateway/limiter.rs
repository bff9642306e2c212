//! Per-user fixed-window rate limiting for gateway actions.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Actions allowed per window.
pub const MAX_ACTIONS: u32 = 100;
/// Window length.
pub const WINDOW: Duration = Duration::from_secs(60);

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window action counter per user id.
///
/// Entries expire lazily: an entry older than the window is reset on its
/// next access, so no per-request timers are scheduled.
pub struct RateLimiter {
    windows: DashMap<String, WindowEntry>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Count one action for `user_id`. Returns `false` when the user is over
    /// the limit for the current window.
    pub fn allow(&self, user_id: &str) -> bool {
        let mut entry = self
            .windows
            .entry(user_id.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                window_start: Instant::now(),
            });

        if entry.window_start.elapsed() >= WINDOW {
            entry.count = 0;
            entry.window_start = Instant::now();
        }

        entry.count += 1;
        entry.count <= MAX_ACTIONS
    }
}
