//! Unread notification queries and read receipts.

use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::gateway::events::{EventName, NotificationPayload, ServerMessage};
use crate::gateway::session::ConnectionSession;
use crate::AppState;

/// `get_notifications` — the caller's unread notifications, newest first,
/// as an array payload.
pub async fn get_notifications(
    state: &AppState,
    session: &ConnectionSession,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;

    let views = state.store.unread_notifications(&user_id).await?;

    let items: Vec<Value> = views
        .iter()
        .map(|view| {
            json!({
                "id": view.notification.id,
                "type": if view.notification.is_invite { "invitation" } else { "notification" },
                "senderId": view.notification.sender_id,
                "senderName": view.sender_name,
                "groupId": view.notification.group_id,
                "groupName": view.group_name,
                "time": view.notification.time,
                "isRead": view.notification.is_read,
            })
        })
        .collect();

    Ok(ServerMessage::new(
        EventName::NOTIFICATIONS,
        Value::Array(items),
    ))
}

/// `mark_notification_read` — receiver-only read receipt.
pub async fn mark_notification_read(
    state: &AppState,
    session: &ConnectionSession,
    payload: NotificationPayload,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;

    let notification = state
        .store
        .find_notification(&payload.notification_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Notification not found"))?;

    if notification.receiver_id != user_id {
        return Err(GatewayError::forbidden(
            "Not authorized to mark this notification as read",
        ));
    }

    state.store.mark_notification_read(&notification.id).await?;

    Ok(ServerMessage::new(
        EventName::NOTIFICATION_MARKED_READ,
        json!({
            "notificationId": notification.id,
            "success": true,
        }),
    ))
}
