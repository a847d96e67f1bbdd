use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

use crate::models::record::RawNotificationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Notifications,
    RoleNotifications,
    EmergencyAlerts,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Notifications,
        Collection::RoleNotifications,
        Collection::EmergencyAlerts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Notifications => "notifications",
            Collection::RoleNotifications => "role_notifications",
            Collection::EmergencyAlerts => "emergency_alerts",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreated {
    pub id: String,
    pub data: RawNotificationRecord,
}
