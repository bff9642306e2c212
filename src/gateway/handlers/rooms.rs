//! Room join and leave flows.

use chrono::Utc;
use serde_json::json;

use crate::error::GatewayError;
use crate::gateway::broadcast::Room;
use crate::gateway::events::{EventName, GroupPayload, ServerMessage};
use crate::gateway::session::ConnectionSession;
use crate::AppState;

/// `join_group` — verify the caller's group membership in storage, then
/// subscribe the connection to the group room. The room set stays unchanged
/// on failure.
pub async fn join_group(
    state: &AppState,
    session: &mut ConnectionSession,
    payload: GroupPayload,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;
    super::check_rate_limit(state, &user_id)?;

    if state
        .store
        .find_membership(&payload.group_id, &user_id)
        .await?
        .is_none()
    {
        return Err(GatewayError::forbidden("Not a member of this group"));
    }

    session.join(Room::group(payload.group_id.clone()));
    state.sessions.add_room(&user_id, &payload.group_id);

    let event = json!({
        "groupId": payload.group_id,
        "userId": user_id,
        "timestamp": Utc::now(),
    });

    state.broadcast.send_to_room_except(
        Room::group(payload.group_id.clone()),
        &session.conn_id,
        ServerMessage::new(EventName::USER_ONLINE, event.clone()),
    );

    Ok(ServerMessage::new(EventName::JOINED_GROUP, event))
}

/// `leave_group` — drop the room from the connection and registry sets.
/// No storage check; leaving a room never joined is a no-op.
pub async fn leave_group(
    state: &AppState,
    session: &mut ConnectionSession,
    payload: GroupPayload,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;

    session.leave(&Room::group(payload.group_id.clone()));
    state.sessions.remove_room(&user_id, &payload.group_id);

    state.broadcast.send_to_room_except(
        Room::group(payload.group_id.clone()),
        &session.conn_id,
        ServerMessage::new(
            EventName::USER_OFFLINE,
            json!({
                "groupId": payload.group_id,
                "userId": user_id,
                "timestamp": Utc::now(),
            }),
        ),
    );

    Ok(ServerMessage::new(
        EventName::LEFT_GROUP,
        json!({
            "groupId": payload.group_id,
            "message": "Successfully left group channel",
        }),
    ))
}
