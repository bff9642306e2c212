//! Per-event action handlers.
//!
//! Every handler resolves the acting user through the Session Registry (a
//! connection replaced by a newer login for the same user stops resolving
//! and is rejected), validates against storage, fans successful outcomes out
//! through the hub, and returns the single caller-scoped reply the event
//! loop writes back. Failures never tear down the connection.

pub mod bookings;
pub mod invitations;
pub mod notifications;
pub mod rooms;
pub mod zikr;

use crate::error::GatewayError;
use crate::AppState;

use super::session::ConnectionSession;

/// Registry-backed identity lookup for an action.
fn acting_user_id(state: &AppState, session: &ConnectionSession) -> Result<String, GatewayError> {
    state
        .sessions
        .user_for_conn(&session.conn_id)
        .ok_or_else(|| GatewayError::unauthenticated("Authentication required"))
}

/// Fixed-window limiter gate for mutating actions.
fn check_rate_limit(state: &AppState, user_id: &str) -> Result<(), GatewayError> {
    if state.limiter.allow(user_id) {
        Ok(())
    } else {
        Err(GatewayError::rate_limited())
    }
}

/// "name surname" as event payloads carry it.
async fn display_name(state: &AppState, user_id: &str) -> Result<String, GatewayError> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("User not found"))?;
    Ok(user.full_name())
}
