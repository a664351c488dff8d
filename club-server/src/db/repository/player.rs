//! Player Repository

use super::{RepoError, RepoResult};
use shared::models::{Player, PlayerCreate};
use sqlx::SqlitePool;

const PLAYER_SELECT: &str =
    "SELECT id, name, email, phone, notes, is_active, created_at, updated_at FROM player";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Player>> {
    let sql = format!("{PLAYER_SELECT} WHERE is_active = 1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Player>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Player>> {
    let sql = format!("{PLAYER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Player>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: PlayerCreate) -> RepoResult<Player> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO player (id, name, email, phone, notes, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.notes)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create player".into()))
}

/// Soft delete; membership history stays intact
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE player SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> PlayerCreate {
        PlayerCreate {
            name: "Alice".into(),
            email: Some("alice@club.test".into()),
            phone: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = crate::db::memory_pool().await;
        let p = create(&pool, alice()).await.unwrap();
        assert_eq!(p.name, "Alice");
        assert!(p.is_active);
        let found = find_by_id(&pool, p.id).await.unwrap().unwrap();
        assert_eq!(found.id, p.id);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list() {
        let pool = crate::db::memory_pool().await;
        let p = create(&pool, alice()).await.unwrap();
        assert!(delete(&pool, p.id).await.unwrap());
        assert!(find_all(&pool).await.unwrap().is_empty());
        // Row still there
        assert!(find_by_id(&pool, p.id).await.unwrap().is_some());
        // Second delete is a no-op
        assert!(!delete(&pool, p.id).await.unwrap());
    }
}
