use serde::{Deserialize, Serialize};

use crate::{
    error::AlertError,
    models::{
        classification::{Classification, EMERGENCY_PRIORITY, classify},
        validation::{optional_text, optional_value, require_text},
    },
};

pub const DEFAULT_TYPE: &str = "general";
pub const ANNOUNCEMENT_TYPE: &str = "announcement";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotificationRecord {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub target_role: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub sender_name: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub action_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    title: String,
    message: String,
    target_role: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    priority: Option<String>,
    sender_name: Option<String>,
    image_url: Option<String>,
    action_data: Option<String>,
}

impl NotificationRecord {
    pub fn new(title: &str, message: &str) -> Result<Self, AlertError> {
        Ok(Self {
            title: require_text("title", Some(title))?,
            message: require_text("message", Some(message))?,
            target_role: None,
            kind: None,
            priority: None,
            sender_name: None,
            image_url: None,
            action_data: None,
        })
    }

    pub fn with_target_role(mut self, role: impl Into<String>) -> Self {
        self.target_role = optional_text(Some(role.into()));
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = optional_value(Some(kind.into()));
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = optional_value(Some(priority.into()));
        self
    }

    pub fn with_sender_name(mut self, sender_name: impl Into<String>) -> Self {
        self.sender_name = optional_text(Some(sender_name.into()));
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = optional_text(Some(image_url.into()));
        self
    }

    pub fn with_action_data(mut self, action_data: impl Into<String>) -> Self {
        self.action_data = optional_text(Some(action_data.into()));
        self
    }

    pub fn escalated(self) -> Self {
        self.with_priority(EMERGENCY_PRIORITY)
    }

    pub fn classification(&self) -> Classification {
        classify(self.kind.as_deref(), self.priority.as_deref())
    }

    pub fn is_emergency(&self) -> bool {
        self.classification().is_emergency()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn target_role(&self) -> Option<&str> {
        self.target_role.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    pub fn sender_name(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn action_data(&self) -> Option<&str> {
        self.action_data.as_deref()
    }
}

impl TryFrom<RawNotificationRecord> for NotificationRecord {
    type Error = AlertError;

    fn try_from(raw: RawNotificationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            title: require_text("title", raw.title.as_deref())?,
            message: require_text("message", raw.message.as_deref())?,
            target_role: optional_text(raw.target_role),
            kind: optional_value(raw.kind),
            priority: optional_value(raw.priority),
            sender_name: optional_text(raw.sender_name),
            image_url: optional_text(raw.image_url),
            action_data: optional_text(raw.action_data),
        })
    }
}
