//! Player Membership Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::membership_type::AllocationType;

/// Membership lifecycle status.
///
/// ACTIVE → INACTIVE: usage exhaustion, expiry, supersession or manual.
/// INACTIVE → ACTIVE: manual reactivation. ACTIVE ↔ PAUSED: manual only.
/// No state is unconditionally terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MembershipStatus {
    Active,
    Inactive,
    Paused,
}

/// Player membership (会籍) — one ACTIVE record per player at any instant.
///
/// Rows are never deleted: reassignment supersedes the prior ACTIVE row
/// (flips it INACTIVE) and inserts a new one. `version` is the optimistic
/// concurrency column — every mutation is `UPDATE … WHERE version = ?`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PlayerMembership {
    pub id: i64,
    pub player_id: i64,
    /// Immutable after creation
    pub membership_type_id: i64,
    pub start_date: Option<NaiveDate>,
    /// None = open-ended
    pub end_date: Option<NaiveDate>,
    /// Supersedes the type's default class_count for this instance
    pub override_class_count: Option<i64>,
    /// Non-negative; changes only via audited signed adjustments
    pub used_classes: i64,
    pub status: MembershipStatus,
    pub auto_deactivate_when_used_up: bool,
    /// Admin-forced bypass of auto-deactivation
    pub manual_override_active: bool,
    pub notes: Option<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Membership joined with its type's allocation policy (for projection and
/// detail views).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MembershipWithType {
    pub id: i64,
    pub player_id: i64,
    pub membership_type_id: i64,
    pub type_name: String,
    pub allocation_type: AllocationType,
    /// Type's default quota (CLASS_COUNT only)
    pub type_class_count: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub override_class_count: Option<i64>,
    pub used_classes: i64,
    pub status: MembershipStatus,
    pub auto_deactivate_when_used_up: bool,
    pub manual_override_active: bool,
    pub notes: Option<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MembershipWithType {
    /// Effective class quota: per-instance override wins over the type
    /// default. None for UNLIMITED / DATE_RANGE.
    pub fn allocated_classes(&self) -> Option<i64> {
        match self.allocation_type {
            AllocationType::ClassCount => {
                Some(self.override_class_count.unwrap_or(self.type_class_count))
            }
            _ => None,
        }
    }

    /// `allocated − used`; None when the allocation has no quota
    pub fn remaining_classes(&self) -> Option<i64> {
        self.allocated_classes().map(|a| a - self.used_classes)
    }
}

/// Assign membership payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMembership {
    pub player_id: i64,
    pub membership_type_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub override_class_count: Option<i64>,
    #[serde(default = "default_true")]
    pub auto_deactivate_when_used_up: bool,
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Adjust usage payload (signed delta + mandatory reason)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustUsage {
    pub delta: i64,
    pub reason: String,
}

/// Toggle manual override payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOverride {
    pub active: bool,
}

/// Set status payload (administrative transition)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatus {
    pub status: MembershipStatus,
}
