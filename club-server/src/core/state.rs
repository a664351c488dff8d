//! 服务器状态 - 持有所有服务的单例引用

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::mpsc;

use crate::audit::{AuditLogRequest, AuditService};
use crate::core::config::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::ledger::MembershipLedger;
use crate::notify::{LogSink, NotificationDispatcher, Reminder};
use crate::utils::AppResult;

/// 服务器状态 - 所有服务的共享引用（Arc 浅拷贝）
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项（不可变） |
/// | pool | SQLite 连接池 |
/// | ledger | 会籍账本服务 |
/// | audit | 审计日志服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub ledger: Arc<MembershipLedger>,
    pub audit: Arc<AuditService>,
    // Worker receivers, taken once by start_background_tasks
    audit_rx: Arc<Mutex<Option<mpsc::Receiver<AuditLogRequest>>>>,
    notify_rx: Arc<Mutex<Option<mpsc::Receiver<Reminder>>>>,
}

impl ServerState {
    /// 初始化所有服务（数据库、账本、审计、通知）
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.db_path()).await?;
        Self::with_pool(config, db.pool)
    }

    /// 以现有连接池构建状态（测试复用内存库）
    pub fn with_pool(config: &Config, pool: SqlitePool) -> AppResult<Self> {
        let (audit, audit_rx) = AuditService::new(pool.clone(), config.audit_buffer_size);
        let (notifier, notify_rx) = NotificationDispatcher::new(config.notify_buffer_size);

        let ledger = Arc::new(MembershipLedger::new(
            pool.clone(),
            Duration::from_secs(config.summary_cache_ttl_secs),
            audit.recorder(),
            notifier,
        ));

        Ok(Self {
            config: config.clone(),
            pool,
            ledger,
            audit,
            audit_rx: Arc::new(Mutex::new(Some(audit_rx))),
            notify_rx: Arc::new(Mutex::new(Some(notify_rx))),
        })
    }

    /// 启动后台任务：审计 writer、通知 worker、到期扫描
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let cancel = tasks.cancel_token();

        if let Some(rx) = self.audit_rx.lock().ok().and_then(|mut rx| rx.take()) {
            tasks.spawn(
                "audit-writer",
                TaskKind::Worker,
                AuditService::run_writer(self.pool.clone(), rx, cancel.clone()),
            );
        }

        if let Some(rx) = self.notify_rx.lock().ok().and_then(|mut rx| rx.take()) {
            tasks.spawn(
                "notification-worker",
                TaskKind::Worker,
                NotificationDispatcher::run_worker(Arc::new(LogSink), rx, cancel.clone()),
            );
        }

        let ledger = self.ledger.clone();
        let interval = Duration::from_secs(self.config.expiry_sweep_interval_secs);
        tasks.spawn("expiry-sweep", TaskKind::Periodic, async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = ledger.expire_memberships(shared::util::today_utc()).await {
                            tracing::warn!(error = %e, "expiry sweep failed");
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        });
    }
}
