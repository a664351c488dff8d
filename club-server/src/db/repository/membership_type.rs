//! Membership Type Registry
//!
//! Read-only catalog of allocation policies. Type definitions are seeded by
//! migration and edited by admin tooling, never by the server.

use super::RepoResult;
use shared::models::MembershipType;
use sqlx::SqlitePool;

const TYPE_SELECT: &str = "SELECT id, name, allocation_type, class_count, start_date_required, end_date_required, is_active, created_at, updated_at FROM membership_type";

/// All active types, name-ordered.
///
/// Degrades to an empty list on store failure — the UI contract is
/// "no types available", never an error page.
pub async fn list_active(pool: &SqlitePool) -> Vec<MembershipType> {
    let sql = format!("{TYPE_SELECT} WHERE is_active = 1 ORDER BY name");
    match sqlx::query_as::<_, MembershipType>(&sql).fetch_all(pool).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "membership_type list unavailable, degrading to empty");
            Vec::new()
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MembershipType>> {
    let sql = format!("{TYPE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MembershipType>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AllocationType;

    #[tokio::test]
    async fn test_seeded_types_are_listed() {
        let pool = crate::db::memory_pool().await;
        let types = list_active(&pool).await;
        assert_eq!(types.len(), 4);
        // Name-ordered
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let pool = crate::db::memory_pool().await;
        let t = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(t.allocation_type, AllocationType::ClassCount);
        assert_eq!(t.class_count, 10);
        assert!(find_by_id(&pool, 9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_types_excluded() {
        let pool = crate::db::memory_pool().await;
        sqlx::query("UPDATE membership_type SET is_active = 0 WHERE id = 4")
            .execute(&pool)
            .await
            .unwrap();
        let types = list_active(&pool).await;
        assert!(types.iter().all(|t| t.id != 4));
    }

    #[tokio::test]
    async fn test_degrades_to_empty_on_store_failure() {
        let pool = crate::db::memory_pool().await;
        pool.close().await;
        assert!(list_active(&pool).await.is_empty());
    }
}
