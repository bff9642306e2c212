//! Pora booking and completion flows.

use chrono::Utc;
use serde_json::json;

use crate::error::GatewayError;
use crate::gateway::broadcast::Room;
use crate::gateway::events::{BookPoraPayload, CompletePoraPayload, EventName, ServerMessage};
use crate::gateway::session::ConnectionSession;
use crate::AppState;

/// `book_pora` — claim a free pora for the caller within a group.
///
/// The free check and the insert are separate storage calls, so two racing
/// bookers can both pass the check; the window is accepted and the storage
/// layer stays simple.
pub async fn book_pora(
    state: &AppState,
    session: &ConnectionSession,
    payload: BookPoraPayload,
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

    let pora = state
        .store
        .find_pora(&payload.pora_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Pora not found"))?;

    if state
        .store
        .find_active_booking(&payload.group_id, &payload.pora_id)
        .await?
        .is_some()
    {
        return Err(GatewayError::conflict("This pora is already booked"));
    }

    let booking = state
        .store
        .create_booking(&payload.group_id, &payload.pora_id, &user_id)
        .await?;

    let user_name = super::display_name(state, &user_id).await?;

    state.broadcast.send_to_room(
        Room::group(payload.group_id.clone()),
        ServerMessage::new(
            EventName::PORA_BOOKED,
            json!({
                "bookingId": booking.id,
                "poraId": payload.pora_id,
                "poraName": pora.name,
                "groupId": payload.group_id,
                "userId": user_id,
                "userName": user_name,
                "timestamp": Utc::now(),
            }),
        ),
    );

    Ok(ServerMessage::new(
        EventName::BOOKING_CONFIRMED,
        json!({
            "bookingId": booking.id,
            "poraId": payload.pora_id,
            "poraName": pora.name,
        }),
    ))
}

/// `complete_pora` — mark the caller's own booking done and advance the
/// group's cycle counter. Reaching the group's juz goal closes the cycle:
/// the counter resets and the hatm count increments, all in one storage
/// transaction, so two racing completions advance the counter exactly once.
pub async fn complete_pora(
    state: &AppState,
    session: &ConnectionSession,
    payload: CompletePoraPayload,
) -> Result<ServerMessage, GatewayError> {
    let user_id = super::acting_user_id(state, session)?;
    super::check_rate_limit(state, &user_id)?;

    let booking = state
        .store
        .find_booking(&payload.booking_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Booking not found"))?;

    if booking.user_id != user_id {
        return Err(GatewayError::forbidden(
            "Not authorized to complete this pora",
        ));
    }
    if booking.is_done {
        return Err(GatewayError::conflict("Pora already completed"));
    }

    let group = state
        .store
        .find_group(&booking.group_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Group not found"))?;

    let pora = state
        .store
        .find_pora(&booking.pora_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Pora not found"))?;

    // A completion that lost the race inside the store reports the same
    // conflict as the is_done check above.
    let progress = state
        .store
        .complete_booking(&booking.id, &booking.group_id, group.juz_goal)
        .await?
        .ok_or_else(|| GatewayError::conflict("Pora already completed"))?;

    let user_name = super::display_name(state, &user_id).await?;

    state.broadcast.send_to_room(
        Room::group(booking.group_id.clone()),
        ServerMessage::new(
            EventName::PORA_COMPLETED,
            json!({
                "bookingId": booking.id,
                "poraId": booking.pora_id,
                "poraName": pora.name,
                "groupId": booking.group_id,
                "groupName": group.name,
                "userId": user_id,
                "userName": user_name,
                "totalFinished": progress.total_finished,
                "hatmCompleted": progress.completed_hatm_count.is_some(),
                "timestamp": Utc::now(),
            }),
        ),
    );

    if let Some(hatm_count) = progress.completed_hatm_count {
        state.broadcast.send_to_room(
            Room::group(booking.group_id.clone()),
            ServerMessage::new(
                EventName::HATM_COMPLETED,
                json!({
                    "groupId": booking.group_id,
                    "groupName": group.name,
                    "completedHatmCount": hatm_count,
                    "timestamp": Utc::now(),
                }),
            ),
        );
    }

    Ok(ServerMessage::new(
        EventName::COMPLETION_CONFIRMED,
        json!({
            "bookingId": booking.id,
            "poraId": booking.pora_id,
            "poraName": pora.name,
        }),
    ))
}
