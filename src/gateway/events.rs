//! Wire-format messages and event names.
//!
//! Both directions use the envelope `{"event": "<name>", "data": {…}}` with
//! camelCase payload fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct ServerMessage {
    pub event: &'static str,
    pub data: Value,
}

impl ServerMessage {
    pub fn new(event: &'static str, data: Value) -> Self {
        Self { event, data }
    }
}

// ---------------------------------------------------------------------------
// Action payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPoraPayload {
    pub pora_id: String,
    pub group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePoraPayload {
    pub booking_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZikrPayload {
    pub group_id: String,
    pub zikr_id: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitationPayload {
    pub receiver_id: String,
    pub group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondInvitationPayload {
    pub notification_id: String,
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub notification_id: String,
}

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// All wire event names, both directions.
pub struct EventName;

impl EventName {
    // inbound
    pub const JOIN_GROUP: &'static str = "join_group";
    pub const LEAVE_GROUP: &'static str = "leave_group";
    pub const BOOK_PORA: &'static str = "book_pora";
    pub const COMPLETE_PORA: &'static str = "complete_pora";
    pub const UPDATE_ZIKR_COUNT: &'static str = "update_zikr_count";
    pub const SEND_INVITATION: &'static str = "send_invitation";
    pub const RESPOND_TO_INVITATION: &'static str = "respond_to_invitation";
    pub const GET_NOTIFICATIONS: &'static str = "get_notifications";
    pub const MARK_NOTIFICATION_READ: &'static str = "mark_notification_read";
    pub const PING: &'static str = "ping";

    // outbound
    pub const CONNECTION_STATUS: &'static str = "connection_status";
    pub const JOINED_GROUP: &'static str = "joined_group";
    pub const LEFT_GROUP: &'static str = "left_group";
    pub const USER_ONLINE: &'static str = "user_online";
    pub const USER_OFFLINE: &'static str = "user_offline";
    pub const PORA_BOOKED: &'static str = "pora_booked";
    pub const BOOKING_CONFIRMED: &'static str = "booking_confirmed";
    pub const PORA_COMPLETED: &'static str = "pora_completed";
    pub const COMPLETION_CONFIRMED: &'static str = "completion_confirmed";
    pub const HATM_COMPLETED: &'static str = "hatm_completed";
    pub const ZIKR_COUNT_UPDATED: &'static str = "zikr_count_updated";
    pub const ZIKR_UPDATE_CONFIRMED: &'static str = "zikr_update_confirmed";
    pub const NEW_INVITATION: &'static str = "new_invitation";
    pub const INVITATION_SENT: &'static str = "invitation_sent";
    pub const INVITATION_ACCEPTED: &'static str = "invitation_accepted";
    pub const INVITATION_REJECTED: &'static str = "invitation_rejected";
    pub const INVITATION_RESPONDED: &'static str = "invitation_responded";
    pub const MEMBER_JOINED: &'static str = "member_joined";
    pub const NOTIFICATIONS: &'static str = "notifications";
    pub const NOTIFICATION_MARKED_READ: &'static str = "notification_marked_read";
    pub const ERROR: &'static str = "error";
    pub const PONG: &'static str = "pong";
}
