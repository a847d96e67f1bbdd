use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLogEntry {
    pub record_id: String,
    pub target: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryLogEntry {
    pub fn success(record_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            target: target.into(),
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        record_id: impl Into<String>,
        target: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            target: target.into(),
            success: false,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}
