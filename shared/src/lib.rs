//! Shared types for the club membership server
//!
//! Data models and payloads shared between `club-server` and frontend
//! clients. DB row derives are gated behind the `db` feature so web/desktop
//! clients don't pull in sqlx.

pub mod models;
pub mod util;

pub use models::*;
