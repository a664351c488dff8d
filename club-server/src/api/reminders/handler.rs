use axum::{Json, extract::State};
use serde::Serialize;
use shared::models::SendReminder;

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Serialize)]
pub struct ReminderResponse {
    /// false 表示队列已满，提醒被丢弃（best-effort）
    pub enqueued: bool,
}

/// POST /api/reminders
pub async fn send(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<SendReminder>,
) -> AppResult<Json<ReminderResponse>> {
    let enqueued = state
        .ledger
        .send_reminder(payload.player_id, payload.alert_code, actor)
        .await?;
    Ok(Json(ReminderResponse { enqueued }))
}
