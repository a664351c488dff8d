//! 审计日志模块
//!
//! 会籍操作的税务级审计日志：所有条目不可变、不可删除，
//! SHA256 哈希链防篡改。与 `usage_adjustment` 表的分工：
//! 调整表是记账账本（每次 delta 一条），审计日志是操作轨迹
//! （谁在什么时候做了什么，含非调整类操作）。

pub mod service;
pub mod storage;
pub mod types;

pub use service::{AuditLogRequest, AuditRecorder, AuditService};
pub use types::{AuditAction, AuditEntry, AuditQuery};
