//! Data models
//!
//! Shared between club-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod actor;
pub mod adjustment;
pub mod membership;
pub mod membership_type;
pub mod notification;
pub mod player;
pub mod summary;

// Re-exports
pub use actor::*;
pub use adjustment::*;
pub use membership::*;
pub use membership_type::*;
pub use notification::*;
pub use player::*;
pub use summary::*;
