//! 审计日志服务
//!
//! 通过 mpsc 通道接收日志请求，单一 writer 任务异步写入 SQLite。
//! 写入方（ledger、API 处理器）持有 [`AuditRecorder`] 句柄，
//! 入队即返回 —— 审计写入失败只记 warn，绝不回滚业务操作。

use std::sync::Arc;

use shared::models::Actor;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::storage::{self, PendingEntry};
use super::types::{AuditAction, AuditEntry, AuditQuery};
use crate::db::repository::RepoResult;

/// 发送到 writer 任务的日志请求
#[derive(Debug)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub actor: Option<Actor>,
    pub details: serde_json::Value,
}

/// 写入方句柄（廉价 clone）
#[derive(Clone, Debug)]
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditLogRequest>,
}

impl AuditRecorder {
    /// 入队一条审计记录。队列满或 writer 已停止时丢弃并 warn。
    pub fn log(
        &self,
        action: AuditAction,
        resource_type: &'static str,
        resource_id: impl ToString,
        actor: Option<Actor>,
        details: serde_json::Value,
    ) {
        let request = AuditLogRequest {
            action,
            resource_type,
            resource_id: resource_id.to_string(),
            actor,
            details,
        };
        if let Err(e) = self.tx.try_send(request) {
            tracing::warn!(error = %e, "audit entry dropped");
        }
    }

    /// 测试用：没有 writer 的黑洞句柄
    #[cfg(test)]
    pub fn disabled() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { tx }
    }
}

/// 审计日志服务
pub struct AuditService {
    pool: SqlitePool,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl AuditService {
    pub fn new(pool: SqlitePool, buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Arc::new(Self { pool, tx }), rx)
    }

    pub fn recorder(&self) -> AuditRecorder {
        AuditRecorder {
            tx: self.tx.clone(),
        }
    }

    /// Writer 任务主循环。取消后先排空队列再退出，避免丢关机前的记录。
    pub async fn run_writer(
        pool: SqlitePool,
        mut rx: mpsc::Receiver<AuditLogRequest>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(request) => Self::write_one(&pool, request).await,
                    None => break,
                },
                _ = cancel.cancelled() => {
                    rx.close();
                    while let Some(request) = rx.recv().await {
                        Self::write_one(&pool, request).await;
                    }
                    break;
                }
            }
        }
        tracing::debug!("audit writer stopped");
    }

    async fn write_one(pool: &SqlitePool, request: AuditLogRequest) {
        let entry = PendingEntry {
            timestamp: shared::util::now_millis(),
            action: request.action.to_string(),
            resource_type: request.resource_type.to_string(),
            resource_id: request.resource_id,
            actor_id: request.actor.map(|a| a.id),
            actor_role: request.actor.map(|a| a.role.as_str().to_string()),
            details: request.details.to_string(),
        };
        if let Err(e) = storage::append(pool, entry).await {
            tracing::warn!(error = %e, "failed to persist audit entry");
        }
    }

    pub async fn query(&self, q: &AuditQuery) -> RepoResult<Vec<AuditEntry>> {
        storage::query(&self.pool, q).await
    }

    /// 链校验：返回第一条被篡改记录的 id
    pub async fn verify_chain(&self) -> RepoResult<Option<i64>> {
        storage::verify_chain(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    #[tokio::test]
    async fn test_recorder_to_writer_round_trip() {
        let pool = crate::db::memory_pool().await;
        let (service, rx) = AuditService::new(pool.clone(), 16);
        let cancel = CancellationToken::new();
        let writer = tokio::spawn(AuditService::run_writer(pool.clone(), rx, cancel.clone()));

        let recorder = service.recorder();
        recorder.log(
            AuditAction::MembershipAssigned,
            "membership",
            100,
            Some(Actor {
                id: 7,
                role: Role::Admin,
            }),
            serde_json::json!({"player_id": 1}),
        );

        // Drain via cancellation, then verify persisted + chained
        cancel.cancel();
        drop(service);
        writer.await.unwrap();

        let entries = storage::query(&pool, &AuditQuery::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "membership_assigned");
        assert_eq!(entries[0].actor_id, Some(7));
        assert_eq!(storage::verify_chain(&pool).await.unwrap(), None);
    }
}
