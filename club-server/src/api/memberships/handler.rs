//! Membership API Handlers
//!
//! Thin layer over the ledger: handlers extract the actor and payload and
//! delegate. All validation and capability checks live in the ledger, so
//! other in-process callers (the expiry sweep) go through the same rules.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{
    AdjustOutcome, AdjustUsage, AdjustmentRecord, AssignMembership, MembershipSummary,
    MembershipWithType, SetStatus, ToggleOverride,
};

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Serialize)]
pub struct AssignResponse {
    pub membership_id: i64,
}

/// POST /api/memberships - 分配会籍（顶替旧的 ACTIVE 会籍)
pub async fn assign(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<AssignMembership>,
) -> AppResult<Json<AssignResponse>> {
    let membership_id = state.ledger.assign(payload, actor).await?;
    Ok(Json(AssignResponse { membership_id }))
}

/// GET /api/memberships/:id - 获取会籍详情（含类型信息）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MembershipWithType>> {
    let membership = state.ledger.get_membership(id).await?;
    Ok(Json(membership))
}

/// POST /api/memberships/:id/adjustments - 用量调整（签名 delta + 理由）
pub async fn adjust_usage(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<AdjustUsage>,
) -> AppResult<Json<AdjustOutcome>> {
    let outcome = state
        .ledger
        .adjust_usage(id, payload.delta, &payload.reason, actor)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/memberships/:id/adjustments - 调整历史（时间倒序）
pub async fn adjustment_history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AdjustmentRecord>>> {
    let records = state.ledger.adjustment_history(id).await?;
    Ok(Json(records))
}

/// PUT /api/memberships/:id/override - 手动豁免开关
pub async fn toggle_override(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleOverride>,
) -> AppResult<Json<MembershipSummary>> {
    let summary = state
        .ledger
        .toggle_manual_override(id, payload.active, actor)
        .await?;
    Ok(Json(summary))
}

/// PUT /api/memberships/:id/status - 管理员状态变更（PAUSED ↔ ACTIVE 等）
pub async fn set_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<SetStatus>,
) -> AppResult<Json<bool>> {
    state.ledger.set_status(id, payload.status, actor).await?;
    Ok(Json(true))
}
