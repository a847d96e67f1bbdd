use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub checks: BTreeMap<String, ServiceHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    pub fn unhealthy(error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: None,
            error: Some(error),
        }
    }
}

// The publish path needs the broker and FCM, so a broken cache only degrades
// the service (duplicate guard off) while anything else makes it unhealthy.
pub fn overall_status(checks: &BTreeMap<String, ServiceHealth>) -> HealthStatus {
    let mut status = HealthStatus::Healthy;

    for (name, health) in checks {
        if health.status == HealthStatus::Healthy {
            continue;
        }

        if name == "cache_service" {
            if status == HealthStatus::Healthy {
                status = HealthStatus::Degraded;
            }
        } else {
            return HealthStatus::Unhealthy;
        }
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_outage_only_degrades() {
        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), ServiceHealth::healthy(3));
        checks.insert(
            "cache_service".to_string(),
            ServiceHealth::unhealthy("refused".to_string()),
        );

        assert_eq!(overall_status(&checks), HealthStatus::Degraded);

        checks.insert(
            "message_broker".to_string(),
            ServiceHealth::unhealthy("refused".to_string()),
        );
        assert_eq!(overall_status(&checks), HealthStatus::Unhealthy);
    }

    #[test]
    fn all_healthy_is_healthy() {
        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), ServiceHealth::healthy(1));
        assert_eq!(overall_status(&checks), HealthStatus::Healthy);
    }
}
