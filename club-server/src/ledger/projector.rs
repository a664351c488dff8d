//! Membership Summary Projector
//!
//! Pure projection of a membership row into its read-optimized summary.
//! Deterministic given (membership, as_of); no clock or store access.
//!
//! The auto-deactivation predicate is computed here AND enforced in the
//! ledger on write. The duplication is intentional: the projector must
//! reflect ledger-pending state (e.g. "this row will deactivate on the next
//! write") so the UI can badge it before the status actually flips.

use chrono::NaiveDate;
use shared::models::{AllocationType, MembershipStatus, MembershipSummary, MembershipWithType};

/// Project a membership into its summary as of a given calendar date.
///
/// Conventions (tested):
/// - `days_left` is the whole-day difference `end_date − as_of`: 0 on the
///   end date itself, negative once past, None when open-ended.
/// - `is_expired` is strictly `end_date < as_of` — a membership is still
///   valid on its end date.
pub fn project(m: &MembershipWithType, as_of: NaiveDate) -> MembershipSummary {
    let allocated_classes = m.allocated_classes();
    let remaining_classes = m.remaining_classes();

    let days_left = m.end_date.map(|end| (end - as_of).num_days());
    let is_expired = m.end_date.is_some_and(|end| end < as_of);

    MembershipSummary {
        membership_id: m.id,
        player_id: m.player_id,
        status: m.status,
        allocation_type: m.allocation_type,
        allocated_classes,
        used_classes: m.used_classes,
        remaining_classes,
        days_left,
        is_expired,
        should_deactivate: should_deactivate(m),
        negative_balance: remaining_classes.is_some_and(|r| r < 0),
    }
}

/// The auto-deactivation predicate, shared verbatim with the ledger:
/// CLASS_COUNT ∧ remaining ≤ 0 ∧ auto_deactivate ∧ no manual override.
pub fn should_deactivate(m: &MembershipWithType) -> bool {
    m.allocation_type == AllocationType::ClassCount
        && m.remaining_classes().is_some_and(|r| r <= 0)
        && m.auto_deactivate_when_used_up
        && !m.manual_override_active
}

/// Status an ACTIVE membership lands on after a write, per the predicate.
/// Non-ACTIVE rows keep their status — the predicate never resurrects or
/// re-pauses anything.
pub fn next_status(m: &MembershipWithType) -> MembershipStatus {
    if m.status == MembershipStatus::Active && should_deactivate(m) {
        MembershipStatus::Inactive
    } else {
        m.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_count_membership(used: i64, quota: i64) -> MembershipWithType {
        MembershipWithType {
            id: 1,
            player_id: 10,
            membership_type_id: 1,
            type_name: "10 Class Pack".into(),
            allocation_type: AllocationType::ClassCount,
            type_class_count: quota,
            start_date: None,
            end_date: None,
            override_class_count: None,
            used_classes: used,
            status: MembershipStatus::Active,
            auto_deactivate_when_used_up: true,
            manual_override_active: false,
            notes: None,
            version: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn date_range_membership(end: &str) -> MembershipWithType {
        MembershipWithType {
            allocation_type: AllocationType::DateRange,
            end_date: Some(end.parse().unwrap()),
            ..class_count_membership(0, 0)
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn class_count_arithmetic() {
        let s = project(&class_count_membership(3, 10), date("2026-08-29"));
        assert_eq!(s.allocated_classes, Some(10));
        assert_eq!(s.used_classes, 3);
        assert_eq!(s.remaining_classes, Some(7));
        assert_eq!(s.days_left, None);
        assert!(!s.is_expired);
        assert!(!s.should_deactivate);
        assert!(!s.negative_balance);
    }

    #[test]
    fn override_supersedes_type_quota() {
        let mut m = class_count_membership(3, 10);
        m.override_class_count = Some(20);
        let s = project(&m, date("2026-08-29"));
        assert_eq!(s.allocated_classes, Some(20));
        assert_eq!(s.remaining_classes, Some(17));
    }

    #[test]
    fn unlimited_has_no_quota() {
        let mut m = class_count_membership(5, 10);
        m.allocation_type = AllocationType::Unlimited;
        let s = project(&m, date("2026-08-29"));
        assert_eq!(s.allocated_classes, None);
        assert_eq!(s.remaining_classes, None);
        assert_eq!(s.used_classes, 5);
        assert!(!s.should_deactivate);
    }

    #[test]
    fn exhausted_quota_flags_deactivation() {
        let s = project(&class_count_membership(10, 10), date("2026-08-29"));
        assert_eq!(s.remaining_classes, Some(0));
        assert!(s.should_deactivate);
        assert!(!s.negative_balance);
    }

    #[test]
    fn manual_override_suppresses_deactivation() {
        let mut m = class_count_membership(11, 10);
        m.manual_override_active = true;
        let s = project(&m, date("2026-08-29"));
        assert_eq!(s.remaining_classes, Some(-1));
        assert!(!s.should_deactivate);
        assert!(s.negative_balance);
    }

    #[test]
    fn auto_deactivate_off_suppresses_deactivation() {
        let mut m = class_count_membership(12, 10);
        m.auto_deactivate_when_used_up = false;
        let s = project(&m, date("2026-08-29"));
        assert!(!s.should_deactivate);
        assert!(s.negative_balance);
    }

    #[test]
    fn days_left_convention() {
        let m = date_range_membership("2026-09-05");
        assert_eq!(project(&m, date("2026-08-29")).days_left, Some(7));
        // 0 on the end date itself, still not expired
        let on_end = project(&m, date("2026-09-05"));
        assert_eq!(on_end.days_left, Some(0));
        assert!(!on_end.is_expired);
        // Negative once past, and expired
        let past = project(&m, date("2026-09-06"));
        assert_eq!(past.days_left, Some(-1));
        assert!(past.is_expired);
    }

    #[test]
    fn end_date_yesterday_is_expired() {
        let m = date_range_membership("2026-08-28");
        let s = project(&m, date("2026-08-29"));
        assert!(s.is_expired);
        assert_eq!(s.days_left, Some(-1));
    }

    #[test]
    fn projection_is_deterministic() {
        let m = class_count_membership(4, 10);
        let as_of = date("2026-08-29");
        assert_eq!(project(&m, as_of), project(&m, as_of));
    }

    #[test]
    fn next_status_only_touches_active_rows() {
        let mut m = class_count_membership(10, 10);
        assert_eq!(next_status(&m), MembershipStatus::Inactive);
        m.status = MembershipStatus::Paused;
        assert_eq!(next_status(&m), MembershipStatus::Paused);
        m.status = MembershipStatus::Inactive;
        assert_eq!(next_status(&m), MembershipStatus::Inactive);
    }
}
