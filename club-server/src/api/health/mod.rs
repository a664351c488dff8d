//! Health Check API

use axum::{Json, extract::State, routing::get, Router};
use serde::Serialize;

use crate::core::ServerState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /api/health - 存活探针（含数据库 ping）
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };
    Json(HealthResponse {
        status: "ok",
        database,
    })
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}
