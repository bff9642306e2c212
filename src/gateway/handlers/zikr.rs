//! Zikr counting flow.

use chrono::Utc;
use serde_json::json;

use crate::error::GatewayError;
use crate::gateway::broadcast::Room;
use crate::gateway::events::{EventName, ServerMessage, UpdateZikrPayload};
use crate::gateway::session::ConnectionSession;
use crate::AppState;

/// `update_zikr_count` — accumulate the caller's repetitions into their
/// per-day tally and the group-wide total for the zikr, atomically at the
/// storage layer.
pub async fn update_zikr_count(
    state: &AppState,
    session: &ConnectionSession,
    payload: UpdateZikrPayload,
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

    let zikr = state
        .store
        .find_zikr(&payload.zikr_id)
        .await?
        .ok_or_else(|| GatewayError::not_found("Zikr not found"))?;

    let today = Utc::now().date_naive();
    let tally = state
        .store
        .record_zikr_count(
            &payload.group_id,
            &payload.zikr_id,
            &user_id,
            payload.count,
            today,
        )
        .await?;

    let goal_reached = tally.total_count >= zikr.goal;
    let progress = zikr_progress(tally.total_count, zikr.goal);

    let user_name = super::display_name(state, &user_id).await?;

    state.broadcast.send_to_room(
        Room::group(payload.group_id.clone()),
        ServerMessage::new(
            EventName::ZIKR_COUNT_UPDATED,
            json!({
                "groupId": payload.group_id,
                "zikrId": payload.zikr_id,
                "zikrName": zikr.name,
                "userId": user_id,
                "userName": user_name,
                "count": payload.count,
                "totalCount": tally.total_count,
                "progress": progress,
                "goalReached": goal_reached,
                "timestamp": Utc::now(),
            }),
        ),
    );

    Ok(ServerMessage::new(
        EventName::ZIKR_UPDATE_CONFIRMED,
        json!({
            "id": tally.entry_id,
            "count": payload.count,
            "totalCount": tally.total_count,
            "goalReached": goal_reached,
        }),
    ))
}

/// Group progress toward the zikr goal as a percentage, capped at 100 and
/// rounded to two decimals.
fn zikr_progress(total: i64, goal: i64) -> f64 {
    if goal <= 0 {
        return 100.0;
    }
    let pct = (total as f64 / goal as f64) * 100.0;
    (pct.min(100.0) * 100.0).round() / 100.0
}
