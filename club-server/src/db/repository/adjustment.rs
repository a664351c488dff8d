//! Usage Adjustment Repository
//!
//! Append-only: this module exposes insert and history reads, nothing else.
//! Corrections are compensating adjustments, never edits.

use super::RepoResult;
use shared::models::{Actor, AdjustmentRecord};
use sqlx::{SqliteConnection, SqlitePool};

/// Append one adjustment. Runs inside the adjust transaction so the record
/// and the counter update commit or roll back together.
pub async fn insert(
    conn: &mut SqliteConnection,
    membership_id: i64,
    delta: i64,
    reason: &str,
    actor: Actor,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO usage_adjustment (id, membership_id, delta, reason, actor_id, actor_role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(membership_id)
    .bind(delta)
    .bind(reason)
    .bind(actor.id)
    .bind(actor.role)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Adjustment history, newest first
pub async fn history(pool: &SqlitePool, membership_id: i64) -> RepoResult<Vec<AdjustmentRecord>> {
    let rows = sqlx::query_as::<_, AdjustmentRecord>(
        "SELECT id, membership_id, delta, reason, actor_id, actor_role, created_at FROM usage_adjustment WHERE membership_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(membership_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
