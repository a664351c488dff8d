//! Membership Type API Handlers

use axum::{Json, extract::State};
use shared::models::MembershipType;

use crate::core::ServerState;

/// GET /api/membership-types - 获取所有启用的会籍类型
///
/// 存储不可用时降级为空列表，不报错。
pub async fn list(State(state): State<ServerState>) -> Json<Vec<MembershipType>> {
    Json(state.ledger.list_types().await)
}
