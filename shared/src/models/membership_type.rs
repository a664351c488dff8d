//! Membership Type Model

use serde::{Deserialize, Serialize};

/// How a membership's usage is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AllocationType {
    /// Fixed quota of classes (`class_count`, overridable per instance)
    ClassCount,
    /// No usage quota; attendance is still recorded
    Unlimited,
    /// Valid between start/end dates, no class quota
    DateRange,
}

impl AllocationType {
    /// DATE_RANGE memberships are meaningless without an end date,
    /// regardless of what the type's `end_date_required` flag says.
    pub fn requires_end_date(&self) -> bool {
        matches!(self, AllocationType::DateRange)
    }
}

/// Membership type (会籍类型) — administrative catalog entry.
///
/// Read-only to the ledger: type definitions are seeded/edited via admin
/// tooling, the server only consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MembershipType {
    pub id: i64,
    pub name: String,
    pub allocation_type: AllocationType,
    /// Default class quota; meaningful only for CLASS_COUNT
    pub class_count: i64,
    pub start_date_required: bool,
    pub end_date_required: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
