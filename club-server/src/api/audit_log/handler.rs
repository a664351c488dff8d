use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use shared::models::Role;

use crate::audit::{AuditEntry, AuditQuery};
use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/audit-log?action=&resource_id=&limit=
///
/// 仅管理员可查询审计日志。
pub async fn query(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Query(q): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    if actor.role != Role::Admin {
        return Err(AppError::Forbidden(
            "audit log access requires admin role".to_string(),
        ));
    }
    let entries = state.audit.query(&q).await?;
    Ok(Json(entries))
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub intact: bool,
    /// 第一条校验失败的记录 id（完整时为 None）
    pub first_tampered_id: Option<i64>,
}

/// GET /api/audit-log/verify - 哈希链完整性校验
pub async fn verify(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<VerifyResponse>> {
    if actor.role != Role::Admin {
        return Err(AppError::Forbidden(
            "audit log access requires admin role".to_string(),
        ));
    }
    let first_tampered_id = state.audit.verify_chain().await?;
    Ok(Json(VerifyResponse {
        intact: first_tampered_id.is_none(),
        first_tampered_id,
    }))
}
