//! Player Membership Repository
//!
//! All mutations are compare-and-swap on the `version` column: the SQL is
//! `UPDATE … WHERE id = ? AND version = ?`, so a stale writer affects zero
//! rows and the caller sees the conflict instead of losing a delta.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{MembershipStatus, MembershipWithType, PlayerMembership};
use sqlx::{SqliteConnection, SqlitePool};

const MEMBERSHIP_SELECT: &str = "SELECT id, player_id, membership_type_id, start_date, end_date, override_class_count, used_classes, status, auto_deactivate_when_used_up, manual_override_active, notes, version, created_at, updated_at FROM player_membership";

const MEMBERSHIP_WITH_TYPE_SELECT: &str = "SELECT m.id, m.player_id, m.membership_type_id, t.name AS type_name, t.allocation_type, t.class_count AS type_class_count, m.start_date, m.end_date, m.override_class_count, m.used_classes, m.status, m.auto_deactivate_when_used_up, m.manual_override_active, m.notes, m.version, m.created_at, m.updated_at FROM player_membership m JOIN membership_type t ON m.membership_type_id = t.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PlayerMembership>> {
    let sql = format!("{MEMBERSHIP_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, PlayerMembership>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_with_type(pool: &SqlitePool, id: i64) -> RepoResult<Option<MembershipWithType>> {
    let sql = format!("{MEMBERSHIP_WITH_TYPE_SELECT} WHERE m.id = ?");
    let row = sqlx::query_as::<_, MembershipWithType>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The player's single ACTIVE membership, if any
pub async fn find_active_by_player(
    pool: &SqlitePool,
    player_id: i64,
) -> RepoResult<Option<MembershipWithType>> {
    let sql = format!("{MEMBERSHIP_WITH_TYPE_SELECT} WHERE m.player_id = ? AND m.status = 'ACTIVE'");
    let row = sqlx::query_as::<_, MembershipWithType>(&sql)
        .bind(player_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Full membership history for a player, newest first
pub async fn find_all_by_player(
    pool: &SqlitePool,
    player_id: i64,
) -> RepoResult<Vec<MembershipWithType>> {
    let sql = format!(
        "{MEMBERSHIP_WITH_TYPE_SELECT} WHERE m.player_id = ? ORDER BY m.created_at DESC, m.id DESC"
    );
    let rows = sqlx::query_as::<_, MembershipWithType>(&sql)
        .bind(player_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Row values for a new membership (status ACTIVE, used_classes 0, version 1)
pub struct NewMembership {
    pub id: i64,
    pub player_id: i64,
    pub membership_type_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub override_class_count: Option<i64>,
    pub auto_deactivate_when_used_up: bool,
    pub notes: Option<String>,
}

/// Insert a fresh ACTIVE membership. Runs inside the assign transaction.
pub async fn insert(conn: &mut SqliteConnection, data: &NewMembership) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO player_membership (id, player_id, membership_type_id, start_date, end_date, override_class_count, used_classes, status, auto_deactivate_when_used_up, manual_override_active, notes, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 'ACTIVE', ?7, 0, ?8, 1, ?9, ?9)",
    )
    .bind(data.id)
    .bind(data.player_id)
    .bind(data.membership_type_id)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.override_class_count)
    .bind(data.auto_deactivate_when_used_up)
    .bind(&data.notes)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Flip the player's current ACTIVE membership (if any) to INACTIVE.
///
/// Runs inside the assign transaction, before [`insert`], so the partial
/// unique index on (player_id, ACTIVE) never sees two ACTIVE rows.
/// Returns the superseded membership id.
pub async fn supersede_active(
    conn: &mut SqliteConnection,
    player_id: i64,
) -> RepoResult<Option<i64>> {
    let now = shared::util::now_millis();
    let id: Option<i64> = sqlx::query_scalar(
        "UPDATE player_membership SET status = 'INACTIVE', version = version + 1, updated_at = ?1 WHERE player_id = ?2 AND status = 'ACTIVE' RETURNING id",
    )
    .bind(now)
    .bind(player_id)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// CAS write of the adjustment result: new used_classes and (possibly
/// unchanged) status. Returns false on version mismatch — caller re-reads
/// and retries.
pub async fn apply_adjustment(
    conn: &mut SqliteConnection,
    id: i64,
    expected_version: i64,
    new_used_classes: i64,
    new_status: MembershipStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE player_membership SET used_classes = ?1, status = ?2, version = version + 1, updated_at = ?3 WHERE id = ?4 AND version = ?5",
    )
    .bind(new_used_classes)
    .bind(new_status)
    .bind(now)
    .bind(id)
    .bind(expected_version)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// CAS write of the manual-override flag plus the status a re-evaluation of
/// the auto-deactivation predicate produced.
pub async fn set_manual_override(
    pool: &SqlitePool,
    id: i64,
    expected_version: i64,
    active: bool,
    new_status: MembershipStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE player_membership SET manual_override_active = ?1, status = ?2, version = version + 1, updated_at = ?3 WHERE id = ?4 AND version = ?5",
    )
    .bind(active)
    .bind(new_status)
    .bind(now)
    .bind(id)
    .bind(expected_version)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// CAS administrative status transition
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    expected_version: i64,
    status: MembershipStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE player_membership SET status = ?1, version = version + 1, updated_at = ?2 WHERE id = ?3 AND version = ?4",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .bind(expected_version)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// ACTIVE memberships whose end_date has passed, excluding manually
/// overridden ones. Consumed by the expiry sweep.
pub async fn find_expired_active(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> RepoResult<Vec<MembershipWithType>> {
    let sql = format!(
        "{MEMBERSHIP_WITH_TYPE_SELECT} WHERE m.status = 'ACTIVE' AND m.manual_override_active = 0 AND m.end_date IS NOT NULL AND m.end_date < ?"
    );
    let rows = sqlx::query_as::<_, MembershipWithType>(&sql)
        .bind(as_of)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Read-back helper for mutation paths that must return the fresh row
pub async fn require_with_type(pool: &SqlitePool, id: i64) -> RepoResult<MembershipWithType> {
    find_with_type(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Membership {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AllocationType;

    async fn seed_player(pool: &SqlitePool, id: i64) {
        sqlx::query("INSERT INTO player (id, name, created_at, updated_at) VALUES (?, 'Test', 0, 0)")
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn seed_membership(pool: &SqlitePool, id: i64, player_id: i64, type_id: i64) {
        seed_player(pool, player_id).await;
        let mut conn = pool.acquire().await.unwrap();
        insert(
            &mut conn,
            &NewMembership {
                id,
                player_id,
                membership_type_id: type_id,
                start_date: None,
                end_date: None,
                override_class_count: None,
                auto_deactivate_when_used_up: true,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_join_fetch() {
        let pool = crate::db::memory_pool().await;
        seed_membership(&pool, 100, 1, 1).await;

        let m = find_with_type(&pool, 100).await.unwrap().unwrap();
        assert_eq!(m.allocation_type, AllocationType::ClassCount);
        assert_eq!(m.type_class_count, 10);
        assert_eq!(m.used_classes, 0);
        assert_eq!(m.version, 1);
        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.allocated_classes(), Some(10));
        assert_eq!(m.remaining_classes(), Some(10));
    }

    #[tokio::test]
    async fn test_cas_rejects_stale_version() {
        let pool = crate::db::memory_pool().await;
        seed_membership(&pool, 100, 1, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        // First write with the correct version succeeds
        assert!(
            apply_adjustment(&mut conn, 100, 1, 3, MembershipStatus::Active)
                .await
                .unwrap()
        );
        // Replay with the stale version touches zero rows
        assert!(
            !apply_adjustment(&mut conn, 100, 1, 5, MembershipStatus::Active)
                .await
                .unwrap()
        );
        // Release the pool's single connection before reading back
        drop(conn);

        let m = find_by_id(&pool, 100).await.unwrap().unwrap();
        assert_eq!(m.used_classes, 3);
        assert_eq!(m.version, 2);
    }

    #[tokio::test]
    async fn test_supersede_leaves_one_active() {
        let pool = crate::db::memory_pool().await;
        seed_membership(&pool, 100, 1, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        let superseded = supersede_active(&mut conn, 1).await.unwrap();
        assert_eq!(superseded, Some(100));
        insert(
            &mut conn,
            &NewMembership {
                id: 101,
                player_id: 1,
                membership_type_id: 2,
                start_date: None,
                end_date: None,
                override_class_count: None,
                auto_deactivate_when_used_up: true,
                notes: None,
            },
        )
        .await
        .unwrap();
        drop(conn);

        let active = find_active_by_player(&pool, 1).await.unwrap().unwrap();
        assert_eq!(active.id, 101);
        let all = find_all_by_player(&pool, 1).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.iter()
                .filter(|m| m.status == MembershipStatus::Active)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_second_active_insert_is_conflict() {
        let pool = crate::db::memory_pool().await;
        seed_membership(&pool, 100, 1, 1).await;

        // A writer that raced past supersede_active hits the partial unique
        // index and must see a conflict, not a generic store failure
        let mut conn = pool.acquire().await.unwrap();
        let err = insert(
            &mut conn,
            &NewMembership {
                id: 101,
                player_id: 1,
                membership_type_id: 2,
                start_date: None,
                end_date: None,
                override_class_count: None,
                auto_deactivate_when_used_up: true,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_supersede_without_active_is_none() {
        let pool = crate::db::memory_pool().await;
        seed_player(&pool, 1).await;
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(supersede_active(&mut conn, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_expired_active_skips_overridden() {
        let pool = crate::db::memory_pool().await;
        seed_player(&pool, 1).await;
        seed_player(&pool, 2).await;
        let yesterday = "2026-08-28";
        for (id, player, overridden) in [(100i64, 1i64, 0i64), (200, 2, 1)] {
            sqlx::query(
                "INSERT INTO player_membership (id, player_id, membership_type_id, end_date, status, manual_override_active, version, created_at, updated_at) VALUES (?1, ?2, 4, ?3, 'ACTIVE', ?4, 1, 0, 0)",
            )
            .bind(id)
            .bind(player)
            .bind(yesterday)
            .bind(overridden)
            .execute(&pool)
            .await
            .unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let expired = find_expired_active(&pool, today).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, 100);
    }
}
