//! Player API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{MembershipSummary, Player, PlayerCreate};

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::db::repository::player;
use crate::utils::{AppError, AppResult};

/// GET /api/players - 获取所有在册球员
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Player>>> {
    let players = player::find_all(&state.pool).await?;
    Ok(Json(players))
}

/// GET /api/players/:id - 获取单个球员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Player>> {
    let found = player::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Player {id}")))?;
    Ok(Json(found))
}

/// POST /api/players - 创建球员
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<PlayerCreate>,
) -> AppResult<Json<Player>> {
    if !actor.role.can_manage_memberships() {
        return Err(AppError::Forbidden(format!(
            "Role {} cannot manage players",
            actor.role
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Player name must not be empty".into()));
    }
    let created = player::create(&state.pool, payload).await?;
    Ok(Json(created))
}

/// DELETE /api/players/:id - 软删除球员（会籍历史保留）
pub async fn delete(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !actor.role.can_manage_memberships() {
        return Err(AppError::Forbidden(format!(
            "Role {} cannot manage players",
            actor.role
        )));
    }
    let removed = player::delete(&state.pool, id).await?;
    if !removed {
        return Err(AppError::not_found(format!("Player {id}")));
    }
    Ok(Json(true))
}

/// GET /api/players/:id/summary - 当前有效会籍摘要（读穿缓存）
pub async fn summary(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MembershipSummary>> {
    let summary = state.ledger.get_summary(id).await?;
    Ok(Json(summary))
}
