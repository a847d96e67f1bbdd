use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyStatus {
    NotFound,
    Processing,
    Sent,
    Failed,
}

impl IdempotencyStatus {
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("processing") => IdempotencyStatus::Processing,
            Some("sent") => IdempotencyStatus::Sent,
            Some("failed") => IdempotencyStatus::Failed,
            _ => IdempotencyStatus::NotFound,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdempotencyStatus::NotFound => "not_found",
            IdempotencyStatus::Processing => "processing",
            IdempotencyStatus::Sent => "sent",
            IdempotencyStatus::Failed => "failed",
        }
    }
}

impl Display for NotificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NotificationStatus::Sending => write!(f, "sending"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
        }
    }
}
