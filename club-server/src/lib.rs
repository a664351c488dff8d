//! Club Server - 俱乐部会籍与课时账本服务
//!
//! # 架构概述
//!
//! 本模块是 Club Server 的主入口，提供以下核心功能：
//!
//! - **会籍账本** (`ledger`): 分配、用量调整、到期停用的单一入口
//! - **审计日志** (`audit`): SHA256 哈希链的不可变操作轨迹
//! - **通知** (`notify`): 余额告警与续费提醒的后台分发
//! - **数据库** (`db`): 嵌入式 SQLite 存储（sqlx + WAL）
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! club-server/src/
//! ├── core/          # 配置、状态、后台任务、服务器
//! ├── auth/          # 请求操作人提取（角色即能力）
//! ├── ledger/        # 账本服务、摘要投影、读缓存
//! ├── audit/         # 审计日志（哈希链）
//! ├── notify/        # 通知分发
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层（连接、迁移、仓储）
//! └── utils/         # 错误、日志工具
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod notify;
pub mod utils;

// Re-export 公共类型
pub use audit::{AuditAction, AuditService};
pub use auth::CurrentActor;
pub use core::{Config, Server, ServerState};
pub use ledger::MembershipLedger;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境：dotenv、工作目录、日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/club".to_string());
    std::fs::create_dir_all(&work_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    if log_dir.is_some() {
        init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    } else {
        init_logger();
    }

    Ok(())
}
