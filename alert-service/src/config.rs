use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::{builder::SoundPolicy, models::message::Collection};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    #[serde(default = "default_notifications_queue")]
    pub notifications_queue: String,
    #[serde(default = "default_role_notifications_queue")]
    pub role_notifications_queue: String,
    #[serde(default = "default_emergency_alerts_queue")]
    pub emergency_alerts_queue: String,
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: u16,

    pub redis_url: String,
    #[serde(default = "default_idempotency_ttl_seconds")]
    pub idempotency_ttl_seconds: u64,
    #[serde(default = "default_processing_lease_seconds")]
    pub processing_lease_seconds: u64,

    pub database_url: String,

    pub fcm_project_id: String,
    #[serde(default = "default_fcm_base_url")]
    pub fcm_base_url: String,

    #[serde(default)]
    pub sound_policy: SoundPolicy,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_notifications_queue() -> String {
    Collection::Notifications.as_str().to_string()
}

fn default_role_notifications_queue() -> String {
    Collection::RoleNotifications.as_str().to_string()
}

fn default_emergency_alerts_queue() -> String {
    Collection::EmergencyAlerts.as_str().to_string()
}

fn default_prefetch_count() -> u16 {
    10
}

fn default_idempotency_ttl_seconds() -> u64 {
    86_400
}

fn default_processing_lease_seconds() -> u64 {
    30
}

fn default_fcm_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))
    }

    pub fn queue_name(&self, collection: Collection) -> &str {
        match collection {
            Collection::Notifications => &self.notifications_queue,
            Collection::RoleNotifications => &self.role_notifications_queue,
            Collection::EmergencyAlerts => &self.emergency_alerts_queue,
        }
    }
}
