//! Membership Summary Model

use serde::{Deserialize, Serialize};

use super::membership::MembershipStatus;
use super::membership_type::AllocationType;

/// Read-optimized membership summary — derived, never persisted.
///
/// Recomputed from the membership row on every (cache-miss) read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSummary {
    pub membership_id: i64,
    pub player_id: i64,
    pub status: MembershipStatus,
    pub allocation_type: AllocationType,
    /// None for UNLIMITED / DATE_RANGE
    pub allocated_classes: Option<i64>,
    pub used_classes: i64,
    pub remaining_classes: Option<i64>,
    /// Whole days until end_date: 0 on the end date itself, negative once
    /// past. None when the membership is open-ended.
    pub days_left: Option<i64>,
    /// Strictly `end_date < as_of` — a membership is still valid on its
    /// end date.
    pub is_expired: bool,
    /// Mirrors the ledger's auto-deactivation predicate so the UI can badge
    /// a pending deactivation before the ledger has flipped status.
    pub should_deactivate: bool,
    /// Overdraft flag: remaining went below zero (allowed, but surfaced)
    pub negative_balance: bool,
}

/// Result of `adjust_usage`: the fresh summary plus the flags the UI needs
/// to acknowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustOutcome {
    pub summary: MembershipSummary,
    /// The adjustment drove remaining_classes below zero
    pub negative_balance: bool,
    /// This adjustment triggered ACTIVE → INACTIVE
    pub deactivated: bool,
}
