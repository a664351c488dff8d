//! Membership API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/memberships", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::assign))
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/adjustments",
            get(handler::adjustment_history).post(handler::adjust_usage),
        )
        .route("/{id}/override", put(handler::toggle_override))
        .route("/{id}/status", put(handler::set_status))
}
