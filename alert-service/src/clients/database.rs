use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    error::AlertError,
    models::{
        audit::DeliveryLogEntry, record::NotificationRecord, status::NotificationStatus,
        user::UserProfile,
    },
    store::{DeliveryLog, NotificationStore, UserDirectory},
};

const SCHEMA: &str = include_str!("../../schema.sql");

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        info!("PostgreSQL connection established");

        Ok(Self { client })
    }

    pub async fn ensure_schema(&self) -> Result<(), Error> {
        self.client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| anyhow!("Failed to apply schema: {}", e))?;

        debug!("Database schema is up to date");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), Error> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| anyhow!("Database health check failed: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl DeliveryLog for PostgresStore {
    async fn append(&self, entry: &DeliveryLogEntry) -> Result<(), AlertError> {
        self.client
            .execute(
                r#"
                INSERT INTO delivery_logs (record_id, target, success, error_message, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
                &[
                    &entry.record_id,
                    &entry.target,
                    &entry.success,
                    &entry.error,
                    &entry.timestamp,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    record_id = %entry.record_id,
                    "Failed to write delivery log to database"
                );
                AlertError::from(e)
            })?;

        debug!(
            record_id = %entry.record_id,
            target = %entry.target,
            success = entry.success,
            "Delivery log written to database"
        );

        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn create(
        &self,
        record: &NotificationRecord,
        created_by: &str,
    ) -> Result<String, AlertError> {
        let id = Uuid::new_v4();
        let status = NotificationStatus::Sending.to_string();

        self.client
            .execute(
                r#"
                INSERT INTO notifications (
                    id,
                    title,
                    message,
                    target_role,
                    type,
                    priority,
                    sender_name,
                    image_url,
                    action_data,
                    status,
                    created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
                &[
                    &id,
                    &record.title(),
                    &record.message(),
                    &record.target_role(),
                    &record.kind(),
                    &record.priority(),
                    &record.sender_name(),
                    &record.image_url(),
                    &record.action_data(),
                    &status,
                    &created_by,
                ],
            )
            .await?;

        debug!(notification_id = %id, "Notification record stored");

        Ok(id.to_string())
    }

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        error: Option<&str>,
    ) -> Result<(), AlertError> {
        let uuid = Uuid::parse_str(id)
            .map_err(|e| AlertError::Validation(format!("Invalid notification id: {}", e)))?;
        let status_str = status.to_string();

        let updated = self
            .client
            .execute(
                r#"
                UPDATE notifications
                SET status = $2, error_message = $3, updated_at = now()
                WHERE id = $1
                "#,
                &[&uuid, &status_str, &error],
            )
            .await?;

        if updated == 0 {
            return Err(AlertError::NotFound(format!("Notification {}", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn get_user(&self, id: &str) -> Result<Option<UserProfile>, AlertError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, role, full_name, name, email FROM users WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(row.map(|row| UserProfile {
            id: row.get("id"),
            role: row.get("role"),
            full_name: row.get("full_name"),
            name: row.get("name"),
            email: row.get("email"),
        }))
    }
}
