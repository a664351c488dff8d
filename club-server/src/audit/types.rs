//! 审计日志类型定义

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 会籍（财务关键）═══
    /// 分配会籍
    MembershipAssigned,
    /// 旧会籍被新分配顶替
    MembershipSuperseded,
    /// 用量调整（带签名 delta 和理由）
    UsageAdjusted,
    /// 手动豁免开启
    ManualOverrideEnabled,
    /// 手动豁免关闭
    ManualOverrideDisabled,
    /// 管理员状态变更
    StatusChanged,
    /// 到期自动停用
    MembershipExpired,

    // ═══ 通知 ═══
    /// 提醒已入队
    ReminderSent,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::MembershipAssigned => "membership_assigned",
            AuditAction::MembershipSuperseded => "membership_superseded",
            AuditAction::UsageAdjusted => "usage_adjusted",
            AuditAction::ManualOverrideEnabled => "manual_override_enabled",
            AuditAction::ManualOverrideDisabled => "manual_override_disabled",
            AuditAction::StatusChanged => "status_changed",
            AuditAction::MembershipExpired => "membership_expired",
            AuditAction::ReminderSent => "reminder_sent",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计日志条目（不可变）
///
/// - `prev_hash`: 前一条记录的哈希（首条为 64 个 '0'）
/// - `curr_hash`: 当前记录的哈希（覆盖 prev_hash + 所有字段）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    /// 全局递增序列号
    pub id: i64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    /// 操作类型（snake_case 文本）
    pub action: String,
    /// 资源类型（"membership", "reminder"）
    pub resource_type: String,
    pub resource_id: String,
    /// 操作人（系统事件为 None）
    pub actor_id: Option<i64>,
    pub actor_role: Option<String>,
    /// 结构化详情（JSON 文本）
    pub details: String,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// 审计日志查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub action: Option<String>,
    pub resource_id: Option<String>,
    /// 最多返回条数（默认 100）
    pub limit: Option<i64>,
}
