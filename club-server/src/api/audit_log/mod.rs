//! 审计日志 API 模块（只读）

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit-log", get(handler::query))
        .route("/api/audit-log/verify", get(handler::verify))
}
