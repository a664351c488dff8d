//! 提醒 API
//!
//! POST /api/reminders - 手动触发续费/到期提醒

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reminders", post(handler::send))
}
