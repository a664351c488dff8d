//! Notification Model

use serde::{Deserialize, Serialize};

/// Alert codes handed to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCode {
    /// CLASS_COUNT quota reached zero
    ClassesExhausted,
    /// Overdraft: remaining went below zero
    NegativeBalance,
    /// end_date passed
    MembershipExpired,
    /// Staff-initiated renewal nudge
    RenewalReminder,
}

impl AlertCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCode::ClassesExhausted => "CLASSES_EXHAUSTED",
            AlertCode::NegativeBalance => "NEGATIVE_BALANCE",
            AlertCode::MembershipExpired => "MEMBERSHIP_EXPIRED",
            AlertCode::RenewalReminder => "RENEWAL_REMINDER",
        }
    }
}

/// Send reminder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReminder {
    pub player_id: i64,
    pub alert_code: AlertCode,
}
