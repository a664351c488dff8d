//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`membership_types`] - 会籍类型目录（只读）
//! - [`players`] - 球员管理接口
//! - [`memberships`] - 会籍账本接口（分配、调整、豁免、状态）
//! - [`reminders`] - 提醒接口
//! - [`audit_log`] - 审计日志查询接口

pub mod audit_log;
pub mod health;
pub mod membership_types;
pub mod memberships;
pub mod players;
pub mod reminders;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
