//! Membership Ledger Service
//!
//! All mutations to a membership funnel through here. Writes are
//! compare-and-swap on the row's `version` column; a CAS miss gets one
//! automatic retry with a fresh read, then surfaces as a conflict. Every
//! mutation is a single SQLite transaction — a failed call leaves both the
//! membership row and the adjustment ledger untouched.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use shared::models::{
    Actor, AdjustOutcome, AdjustmentRecord, AlertCode, AllocationType, AssignMembership,
    MembershipStatus, MembershipSummary, MembershipType, MembershipWithType,
};
use sqlx::SqlitePool;

use crate::audit::{AuditAction, AuditRecorder};
use crate::db::repository::{RepoError, adjustment, membership, membership_type, player};
use crate::notify::NotificationDispatcher;
use crate::utils::{AppError, AppResult};

use super::cache::SummaryCache;
use super::projector;

/// One fresh-read retry after a CAS miss, then give up
const CAS_ATTEMPTS: u32 = 2;

pub struct MembershipLedger {
    pool: SqlitePool,
    cache: Arc<SummaryCache>,
    audit: AuditRecorder,
    notifier: NotificationDispatcher,
}

impl MembershipLedger {
    pub fn new(
        pool: SqlitePool,
        cache_ttl: Duration,
        audit: AuditRecorder,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            pool,
            cache: Arc::new(SummaryCache::new(cache_ttl)),
            audit,
            notifier,
        }
    }

    fn require_capability(actor: Actor) -> AppResult<()> {
        if actor.role.can_manage_memberships() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} cannot manage memberships",
                actor.role
            )))
        }
    }

    /// Active membership types for assignment UIs. Degrades to empty.
    pub async fn list_types(&self) -> Vec<MembershipType> {
        membership_type::list_active(&self.pool).await
    }

    /// Assign a membership, superseding any prior ACTIVE one for the
    /// player. Returns the new membership id.
    pub async fn assign(&self, req: AssignMembership, actor: Actor) -> AppResult<i64> {
        Self::require_capability(actor)?;

        player::find_by_id(&self.pool, req.player_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Player {} not found", req.player_id)))?;
        let membership_type = membership_type::find_by_id(&self.pool, req.membership_type_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Membership type {} does not exist",
                    req.membership_type_id
                ))
            })?;
        if !membership_type.is_active {
            return Err(AppError::Validation(format!(
                "Membership type '{}' is inactive",
                membership_type.name
            )));
        }
        Self::validate_assignment(&membership_type, &req)?;

        let id = shared::util::snowflake_id();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let superseded = membership::supersede_active(&mut tx, req.player_id).await?;
        membership::insert(
            &mut tx,
            &membership::NewMembership {
                id,
                player_id: req.player_id,
                membership_type_id: req.membership_type_id,
                start_date: req.start_date,
                end_date: req.end_date,
                override_class_count: req.override_class_count,
                auto_deactivate_when_used_up: req.auto_deactivate_when_used_up,
                notes: req.notes.clone(),
            },
        )
        .await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        if let Some(old_id) = superseded {
            self.audit.log(
                AuditAction::MembershipSuperseded,
                "membership",
                old_id,
                Some(actor),
                serde_json::json!({ "superseded_by": id }),
            );
        }
        self.audit.log(
            AuditAction::MembershipAssigned,
            "membership",
            id,
            Some(actor),
            serde_json::json!({
                "player_id": req.player_id,
                "membership_type_id": req.membership_type_id,
                "override_class_count": req.override_class_count,
            }),
        );
        self.cache.invalidate(req.player_id);

        tracing::info!(
            membership_id = id,
            player_id = req.player_id,
            type_id = req.membership_type_id,
            "membership assigned"
        );
        Ok(id)
    }

    fn validate_assignment(t: &MembershipType, req: &AssignMembership) -> AppResult<()> {
        if t.start_date_required && req.start_date.is_none() {
            return Err(AppError::Validation(format!(
                "Membership type '{}' requires a start date",
                t.name
            )));
        }
        if (t.end_date_required || t.allocation_type.requires_end_date())
            && req.end_date.is_none()
        {
            return Err(AppError::Validation(format!(
                "Membership type '{}' requires an end date",
                t.name
            )));
        }
        if let (Some(start), Some(end)) = (req.start_date, req.end_date)
            && end < start
        {
            return Err(AppError::Validation(
                "end_date must not precede start_date".into(),
            ));
        }
        if let Some(override_count) = req.override_class_count {
            if t.allocation_type != AllocationType::ClassCount {
                return Err(AppError::Validation(
                    "override_class_count only applies to CLASS_COUNT types".into(),
                ));
            }
            if override_count < 0 {
                return Err(AppError::Validation(
                    "override_class_count must not be negative".into(),
                ));
            }
        }
        Ok(())
    }

    /// Apply a signed, reasoned usage adjustment.
    ///
    /// Overdraft (remaining below zero) is allowed and surfaced via the
    /// outcome's `negative_balance` flag — staff corrections are warned
    /// about, not blocked. `used_classes` going negative is rejected.
    pub async fn adjust_usage(
        &self,
        membership_id: i64,
        delta: i64,
        reason: &str,
        actor: Actor,
    ) -> AppResult<AdjustOutcome> {
        Self::require_capability(actor)?;
        if delta == 0 {
            return Err(AppError::InvalidAdjustment(
                "Adjustment delta must be non-zero".into(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Adjustment reason must not be empty".into(),
            ));
        }

        let mut last_conflict = None;
        for _attempt in 0..CAS_ATTEMPTS {
            let m = membership::require_with_type(&self.pool, membership_id).await?;

            let new_used = m.used_classes.checked_add(delta).ok_or_else(|| {
                AppError::InvalidAdjustment("Adjustment delta is out of range".into())
            })?;
            if new_used < 0 {
                return Err(AppError::InvalidAdjustment(format!(
                    "Adjustment would drive used_classes to {new_used}"
                )));
            }

            // Evaluate the post-adjustment row before writing, so the CAS
            // carries the status transition atomically with the counter.
            let mut after = m.clone();
            after.used_classes = new_used;
            let new_status = projector::next_status(&after);
            let deactivated = new_status != m.status;

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            let applied =
                membership::apply_adjustment(&mut tx, membership_id, m.version, new_used, new_status)
                    .await?;
            if !applied {
                // Stale read: another writer won. Roll back and re-read.
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;
                last_conflict = Some(m.version);
                continue;
            }
            adjustment::insert(&mut tx, membership_id, delta, reason, actor).await?;
            tx.commit()
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            after.status = new_status;
            after.version = m.version + 1;
            let summary = projector::project(&after, shared::util::today_utc());
            let negative_balance = summary.negative_balance;

            self.audit.log(
                AuditAction::UsageAdjusted,
                "membership",
                membership_id,
                Some(actor),
                serde_json::json!({
                    "delta": delta,
                    "reason": reason,
                    "used_classes": new_used,
                    "remaining_classes": summary.remaining_classes,
                    "deactivated": deactivated,
                }),
            );
            self.cache.invalidate(m.player_id);

            if deactivated || summary.remaining_classes == Some(0) {
                self.notifier.enqueue(m.player_id, AlertCode::ClassesExhausted);
            } else if negative_balance {
                self.notifier.enqueue(m.player_id, AlertCode::NegativeBalance);
            }

            return Ok(AdjustOutcome {
                summary,
                negative_balance,
                deactivated,
            });
        }

        Err(AppError::Conflict(format!(
            "Membership {membership_id} was modified concurrently (version {})",
            last_conflict.unwrap_or_default()
        )))
    }

    /// Set or clear the admin override that suppresses auto-deactivation.
    /// Clearing it re-evaluates the predicate immediately.
    pub async fn toggle_manual_override(
        &self,
        membership_id: i64,
        active: bool,
        actor: Actor,
    ) -> AppResult<MembershipSummary> {
        Self::require_capability(actor)?;

        for _attempt in 0..CAS_ATTEMPTS {
            let m = membership::require_with_type(&self.pool, membership_id).await?;

            let mut after = m.clone();
            after.manual_override_active = active;
            let new_status = projector::next_status(&after);

            let applied =
                membership::set_manual_override(&self.pool, membership_id, m.version, active, new_status)
                    .await?;
            if !applied {
                continue;
            }

            after.status = new_status;
            after.version = m.version + 1;
            self.audit.log(
                if active {
                    AuditAction::ManualOverrideEnabled
                } else {
                    AuditAction::ManualOverrideDisabled
                },
                "membership",
                membership_id,
                Some(actor),
                serde_json::json!({ "status": new_status }),
            );
            self.cache.invalidate(m.player_id);
            return Ok(projector::project(&after, shared::util::today_utc()));
        }

        Err(AppError::Conflict(format!(
            "Membership {membership_id} was modified concurrently"
        )))
    }

    /// Administrative status transition (PAUSED ↔ ACTIVE, reactivation).
    /// Only enum validity is enforced — axum already rejects non-enum input
    /// at deserialization.
    pub async fn set_status(
        &self,
        membership_id: i64,
        status: MembershipStatus,
        actor: Actor,
    ) -> AppResult<()> {
        Self::require_capability(actor)?;

        for _attempt in 0..CAS_ATTEMPTS {
            let m = membership::require_with_type(&self.pool, membership_id).await?;
            if m.status == status {
                return Ok(());
            }
            let applied =
                membership::set_status(&self.pool, membership_id, m.version, status).await?;
            if !applied {
                continue;
            }

            self.audit.log(
                AuditAction::StatusChanged,
                "membership",
                membership_id,
                Some(actor),
                serde_json::json!({ "from": m.status, "to": status }),
            );
            self.cache.invalidate(m.player_id);
            return Ok(());
        }

        Err(AppError::Conflict(format!(
            "Membership {membership_id} was modified concurrently"
        )))
    }

    /// Read-through summary for the player's ACTIVE membership
    pub async fn get_summary(&self, player_id: i64) -> AppResult<MembershipSummary> {
        if let Some(cached) = self.cache.get(player_id) {
            return Ok(cached);
        }
        let m = membership::find_active_by_player(&self.pool, player_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Player {player_id} has no active membership"))
            })?;
        let summary = projector::project(&m, shared::util::today_utc());
        self.cache.put(player_id, summary.clone());
        Ok(summary)
    }

    pub async fn get_membership(&self, membership_id: i64) -> AppResult<MembershipWithType> {
        Ok(membership::require_with_type(&self.pool, membership_id).await?)
    }

    pub async fn adjustment_history(
        &self,
        membership_id: i64,
    ) -> AppResult<Vec<AdjustmentRecord>> {
        // 404 over an empty list when the membership itself is unknown
        membership::require_with_type(&self.pool, membership_id).await?;
        Ok(adjustment::history(&self.pool, membership_id).await?)
    }

    /// Queue a reminder for a player. Best-effort by contract.
    pub async fn send_reminder(
        &self,
        player_id: i64,
        alert_code: AlertCode,
        actor: Actor,
    ) -> AppResult<bool> {
        Self::require_capability(actor)?;
        let queued = self.notifier.enqueue(player_id, alert_code);
        if queued {
            self.audit.log(
                AuditAction::ReminderSent,
                "reminder",
                player_id,
                Some(actor),
                serde_json::json!({ "alert_code": alert_code }),
            );
        }
        Ok(queued)
    }

    /// Deactivate ACTIVE memberships whose end date has passed. Run by the
    /// periodic sweep; manual override rows are skipped. Returns how many
    /// rows were flipped.
    pub async fn expire_memberships(&self, as_of: NaiveDate) -> AppResult<usize> {
        let expired = membership::find_expired_active(&self.pool, as_of).await?;
        let mut count = 0;
        for m in expired {
            // CAS with the sweep's read version; a concurrent staff write
            // wins and the row is picked up on the next sweep.
            match membership::set_status(&self.pool, m.id, m.version, MembershipStatus::Inactive)
                .await
            {
                Ok(true) => {
                    self.audit.log(
                        AuditAction::MembershipExpired,
                        "membership",
                        m.id,
                        None,
                        serde_json::json!({ "end_date": m.end_date, "as_of": as_of }),
                    );
                    self.cache.invalidate(m.player_id);
                    self.notifier.enqueue(m.player_id, AlertCode::MembershipExpired);
                    count += 1;
                }
                Ok(false) => {
                    tracing::debug!(membership_id = m.id, "expiry sweep lost CAS, skipping");
                }
                Err(RepoError::Database(e)) => {
                    tracing::warn!(membership_id = m.id, error = %e, "expiry sweep write failed");
                }
                Err(e) => return Err(e.into()),
            }
        }
        if count > 0 {
            tracing::info!(count, %as_of, "expired memberships deactivated");
        }
        Ok(count)
    }
}
