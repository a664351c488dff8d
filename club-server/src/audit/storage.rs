//! 审计日志存储
//!
//! 追加写入 + 哈希链计算。没有 update/delete —— 审计日志只能追加。
//! 只有单一 writer 任务调用 [`append`]，链的线性由此保证。

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use super::types::{AuditEntry, AuditQuery};
use crate::db::repository::RepoResult;

/// 创世哈希：链上第一条记录的 prev_hash
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// 待写入的审计记录（不含链字段，由 append 补全）
pub struct PendingEntry {
    pub timestamp: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub actor_id: Option<i64>,
    pub actor_role: Option<String>,
    pub details: String,
}

fn compute_hash(prev_hash: &str, e: &PendingEntry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(e.timestamp.to_le_bytes());
    hasher.update(e.action.as_bytes());
    hasher.update(e.resource_type.as_bytes());
    hasher.update(e.resource_id.as_bytes());
    if let Some(id) = e.actor_id {
        hasher.update(id.to_le_bytes());
    }
    if let Some(role) = &e.actor_role {
        hasher.update(role.as_bytes());
    }
    hasher.update(e.details.as_bytes());
    hex::encode(hasher.finalize())
}

async fn last_hash(pool: &SqlitePool) -> RepoResult<String> {
    let hash: Option<String> =
        sqlx::query_scalar("SELECT curr_hash FROM audit_log ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(hash.unwrap_or_else(|| GENESIS_HASH.to_string()))
}

/// 追加一条审计记录，返回其序列号
pub async fn append(pool: &SqlitePool, entry: PendingEntry) -> RepoResult<i64> {
    let prev_hash = last_hash(pool).await?;
    let curr_hash = compute_hash(&prev_hash, &entry);

    let result = sqlx::query(
        "INSERT INTO audit_log (timestamp, action, resource_type, resource_id, actor_id, actor_role, details, prev_hash, curr_hash) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(entry.timestamp)
    .bind(&entry.action)
    .bind(&entry.resource_type)
    .bind(&entry.resource_id)
    .bind(entry.actor_id)
    .bind(&entry.actor_role)
    .bind(&entry.details)
    .bind(&prev_hash)
    .bind(&curr_hash)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// 条件查询，时间倒序
pub async fn query(pool: &SqlitePool, q: &AuditQuery) -> RepoResult<Vec<AuditEntry>> {
    let mut sql = String::from(
        "SELECT id, timestamp, action, resource_type, resource_id, actor_id, actor_role, details, prev_hash, curr_hash FROM audit_log WHERE 1=1",
    );
    if q.action.is_some() {
        sql.push_str(" AND action = ?");
    }
    if q.resource_id.is_some() {
        sql.push_str(" AND resource_id = ?");
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?");

    let mut query = sqlx::query_as::<_, AuditEntry>(&sql);
    if let Some(action) = &q.action {
        query = query.bind(action.clone());
    }
    if let Some(rid) = &q.resource_id {
        query = query.bind(rid.clone());
    }
    query = query.bind(q.limit.unwrap_or(100).clamp(1, 1000));

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// 全链校验：逐条重算哈希并核对链接关系。
/// 返回第一条被篡改记录的 id；链完整则返回 None。
pub async fn verify_chain(pool: &SqlitePool) -> RepoResult<Option<i64>> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        "SELECT id, timestamp, action, resource_type, resource_id, actor_id, actor_role, details, prev_hash, curr_hash FROM audit_log ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    let mut expected_prev = GENESIS_HASH.to_string();
    for row in rows {
        if row.prev_hash != expected_prev {
            return Ok(Some(row.id));
        }
        let pending = PendingEntry {
            timestamp: row.timestamp,
            action: row.action.clone(),
            resource_type: row.resource_type.clone(),
            resource_id: row.resource_id.clone(),
            actor_id: row.actor_id,
            actor_role: row.actor_role.clone(),
            details: row.details.clone(),
        };
        if compute_hash(&row.prev_hash, &pending) != row.curr_hash {
            return Ok(Some(row.id));
        }
        expected_prev = row.curr_hash;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: &str, resource_id: &str) -> PendingEntry {
        PendingEntry {
            timestamp: shared::util::now_millis(),
            action: action.into(),
            resource_type: "membership".into(),
            resource_id: resource_id.into(),
            actor_id: Some(7),
            actor_role: Some("ADMIN".into()),
            details: "{}".into(),
        }
    }

    #[tokio::test]
    async fn test_chain_links_and_verifies() {
        let pool = crate::db::memory_pool().await;
        append(&pool, entry("membership_assigned", "100")).await.unwrap();
        append(&pool, entry("usage_adjusted", "100")).await.unwrap();
        append(&pool, entry("usage_adjusted", "100")).await.unwrap();

        assert_eq!(verify_chain(&pool).await.unwrap(), None);

        let entries = query(&pool, &AuditQuery::default()).await.unwrap();
        assert_eq!(entries.len(), 3);
        // Newest first; each links to its predecessor
        assert_eq!(entries[0].prev_hash, entries[1].curr_hash);
        assert_eq!(entries[2].prev_hash, GENESIS_HASH);
    }

    #[tokio::test]
    async fn test_tampering_is_detected() {
        let pool = crate::db::memory_pool().await;
        append(&pool, entry("membership_assigned", "100")).await.unwrap();
        let second = append(&pool, entry("usage_adjusted", "100")).await.unwrap();
        append(&pool, entry("usage_adjusted", "100")).await.unwrap();

        // Rewriting history breaks the chain at the tampered row
        sqlx::query("UPDATE audit_log SET details = '{\"delta\":99}' WHERE id = ?")
            .bind(second)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(verify_chain(&pool).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_query_filters() {
        let pool = crate::db::memory_pool().await;
        append(&pool, entry("membership_assigned", "100")).await.unwrap();
        append(&pool, entry("usage_adjusted", "100")).await.unwrap();
        append(&pool, entry("usage_adjusted", "200")).await.unwrap();

        let q = AuditQuery {
            action: Some("usage_adjusted".into()),
            resource_id: Some("100".into()),
            limit: None,
        };
        let rows = query(&pool, &q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource_id, "100");
    }
}
