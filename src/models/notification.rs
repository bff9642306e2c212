use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::notifications;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    /// Set for group invitations.
    pub group_id: Option<String>,
    pub is_invite: bool,
    pub is_read: bool,
    pub status: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub id: &'a str,
    pub sender_id: &'a str,
    pub receiver_id: &'a str,
    pub group_id: Option<&'a str>,
    pub is_invite: bool,
    pub is_read: bool,
    pub status: &'a str,
    pub time: DateTime<Utc>,
}

/// Lifecycle of an invitation notification.
pub mod invite_status {
    pub const PENDING: &str = "PENDING";
    pub const ACCEPTED: &str = "ACCEPTED";
    pub const IGNORED: &str = "IGNORED";
}
