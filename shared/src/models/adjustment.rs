//! Usage Adjustment Model

use serde::{Deserialize, Serialize};

use super::actor::Role;

/// One audited usage adjustment (append-only).
///
/// Every non-zero change to `used_classes` has exactly one of these.
/// Corrections are made via a new compensating adjustment, never by editing
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdjustmentRecord {
    pub id: i64,
    pub membership_id: i64,
    /// Signed, never zero
    pub delta: i64,
    /// Non-empty after trimming
    pub reason: String,
    pub actor_id: i64,
    pub actor_role: Role,
    pub created_at: i64,
}
