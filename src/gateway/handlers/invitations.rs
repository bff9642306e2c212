//! Group invitation flows.

use chrono::Utc;
use serde_json::json;

use crate::error::GatewayError;
use crate::gateway::broadcast::Room;
use crate::gateway::events::{
    EventName, RespondInvitationPayload, SendInvitationPayload, ServerMessage,
};
use crate::gateway::session::ConnectionSession;
use crate::models::notification::invite_status;
use crate::AppState;

/// `send_invitation` — the group admin invites a user. Creates a pending
/// invitation notification and pushes it to the receiver's user room when
/// they are online.
pub async fn send_invitation(
    state: &AppState,
    session: &ConnectionSession,
    payload: SendInvitationPayload,
) -> Result<ServerMessage, GatewayError> {
    let sender_id = super::acting_user_id(state, session)?;
    super::check_rate_limit(state, &sender_id)?;

    let group = state
        .store
        .find_group(&payload.group_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Group not found"))?;

    if group.admin_id != sender_id {
        return Err(GatewayError::forbidden(
            "Only group admins can send invitations",
        ));
    }

    if state
        .store
        .find_user(&payload.receiver_id)
        .await?
        .is_none()
    {
        return Err(GatewayError::not_found("User not found"));
    }

    if state
        .store
        .find_membership(&payload.group_id, &payload.receiver_id)
        .await?
        .is_some()
    {
        return Err(GatewayError::conflict(
            "User is already a member of this group",
        ));
    }

    if state
        .store
        .find_pending_invitation(&payload.receiver_id, &payload.group_id)
        .await?
        .is_some()
    {
        return Err(GatewayError::conflict(
            "A pending invitation to this group already exists for this user",
        ));
    }

    let notification = state
        .store
        .create_invitation(&sender_id, &payload.receiver_id, &payload.group_id)
        .await?;

    if state.sessions.is_online(&payload.receiver_id) {
        let sender_name = super::display_name(state, &sender_id).await?;
        state.broadcast.send_to_user(
            &payload.receiver_id,
            ServerMessage::new(
                EventName::NEW_INVITATION,
                json!({
                    "id": notification.id,
                    "senderId": sender_id,
                    "senderName": sender_name,
                    "groupId": payload.group_id,
                    "groupName": group.name,
                    "time": notification.time,
                }),
            ),
        );
    }

    Ok(ServerMessage::new(
        EventName::INVITATION_SENT,
        json!({
            "id": notification.id,
            "receiverId": payload.receiver_id,
            "groupId": payload.group_id,
            "time": notification.time,
        }),
    ))
}

/// `respond_to_invitation` — the receiver accepts or rejects a pending
/// invitation. Accepting adds the membership (idempotently) and subscribes
/// the connection to the group room; either way the sender is notified on
/// their user room.
pub async fn respond_to_invitation(
    state: &AppState,
    session: &mut ConnectionSession,
    payload: RespondInvitationPayload,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;
    super::check_rate_limit(state, &user_id)?;

    let notification = state
        .store
        .find_notification(&payload.notification_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Invitation not found"))?;

    if notification.receiver_id != user_id {
        return Err(GatewayError::forbidden(
            "Not authorized to respond to this invitation",
        ));
    }

    let group_id = match (&notification.group_id, notification.is_invite) {
        (Some(group_id), true) => group_id.clone(),
        _ => {
            return Err(GatewayError::conflict(
                "This notification is not an invitation",
            ));
        }
    };

    let group = state
        .store
        .find_group(&group_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Group not found"))?;

    if notification.status != invite_status::PENDING {
        return Err(GatewayError::conflict(
            "This invitation is no longer pending",
        ));
    }

    if payload.accept {
        state
            .store
            .accept_invitation(&notification.id, &user_id, &group_id)
            .await?;

        session.join(Room::group(group_id.clone()));
        state.sessions.add_room(&user_id, &group_id);

        let user_name = super::display_name(state, &user_id).await?;

        state.broadcast.send_to_room(
            Room::group(group_id.clone()),
            ServerMessage::new(
                EventName::MEMBER_JOINED,
                json!({
                    "groupId": group_id,
                    "groupName": group.name,
                    "userId": user_id,
                    "userName": user_name,
                    "timestamp": Utc::now(),
                }),
            ),
        );

        state.broadcast.send_to_user(
            &notification.sender_id,
            ServerMessage::new(
                EventName::INVITATION_ACCEPTED,
                json!({
                    "notificationId": notification.id,
                    "groupId": group_id,
                    "groupName": group.name,
                    "userId": user_id,
                    "userName": user_name,
                }),
            ),
        );
    } else {
        state.store.ignore_invitation(&notification.id).await?;

        state.broadcast.send_to_user(
            &notification.sender_id,
            ServerMessage::new(
                EventName::INVITATION_REJECTED,
                json!({
                    "notificationId": notification.id,
                    "groupId": group_id,
                    "groupName": group.name,
                    "userId": user_id,
                }),
            ),
        );
    }

    Ok(ServerMessage::new(
        EventName::INVITATION_RESPONDED,
        json!({
            "notificationId": notification.id,
            "accepted": payload.accept,
            "groupId": group_id,
            "groupName": group.name,
        }),
    ))
}
