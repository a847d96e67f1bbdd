use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

pub const URGENT_TYPE: &str = "urgent";
pub const EMERGENCY_PRIORITY: &str = "emergency";
pub const NORMAL_PRIORITY: &str = "normal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Normal,
    Emergency,
}

// The single emergency predicate. Server-side payload construction and the
// on-device override trigger must both go through here.
pub fn classify(kind: Option<&str>, priority: Option<&str>) -> Classification {
    if kind == Some(URGENT_TYPE) || priority == Some(EMERGENCY_PRIORITY) {
        Classification::Emergency
    } else {
        Classification::Normal
    }
}

impl Classification {
    pub fn from_data(data: &HashMap<String, String>) -> Self {
        classify(
            data.get("type").map(String::as_str),
            data.get("priority").map(String::as_str),
        )
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Classification::Emergency)
    }

    pub fn priority_value(&self) -> &'static str {
        match self {
            Classification::Emergency => EMERGENCY_PRIORITY,
            Classification::Normal => NORMAL_PRIORITY,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Classification::Normal => write!(f, "normal"),
            Classification::Emergency => write!(f, "emergency"),
        }
    }
}
