use async_trait::async_trait;

use crate::{
    error::AlertError,
    models::{
        audit::DeliveryLogEntry,
        record::NotificationRecord,
        status::{IdempotencyStatus, NotificationStatus},
        user::UserProfile,
    },
};

#[async_trait]
pub trait DeliveryLog: Send + Sync {
    async fn append(&self, entry: &DeliveryLogEntry) -> Result<(), AlertError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, record: &NotificationRecord, created_by: &str)
    -> Result<String, AlertError>;

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        error: Option<&str>,
    ) -> Result<(), AlertError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<UserProfile>, AlertError>;
}

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    // Atomically marks `key` as processing for a short lease and returns the
    // previous status. `NotFound` and `Failed` mean the caller now owns it.
    // An expired processing claim reads as `NotFound`.
    async fn claim(&self, key: &str) -> Result<IdempotencyStatus, AlertError>;

    async fn mark_sent(&self, key: &str) -> Result<(), AlertError>;

    async fn mark_failed(&self, key: &str) -> Result<(), AlertError>;
}
