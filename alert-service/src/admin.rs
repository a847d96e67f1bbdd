use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    dispatcher::{DeliveryOutcome, Dispatcher},
    error::AlertError,
    models::{
        message::Collection,
        record::{NotificationRecord, RawNotificationRecord},
        role::Audience,
        status::NotificationStatus,
        user::UserProfile,
    },
    store::{NotificationStore, UserDirectory},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSendRequest {
    #[serde(flatten)]
    pub record: RawNotificationRecord,

    #[serde(default)]
    pub target_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub topic: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSendResponse {
    pub notification_id: String,
    pub emergency: bool,
    pub results: Vec<TargetResult>,
}

pub struct AdminSender {
    dispatcher: Arc<Dispatcher>,
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn NotificationStore>,
}

impl AdminSender {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            dispatcher,
            users,
            store,
        }
    }

    pub async fn send(
        &self,
        caller_id: Option<&str>,
        request: AdminSendRequest,
    ) -> Result<AdminSendResponse, AlertError> {
        self.send_as_admin(caller_id, request)
            .await
            .map_err(AlertError::into_caller_error)
    }

    async fn send_as_admin(
        &self,
        caller_id: Option<&str>,
        request: AdminSendRequest,
    ) -> Result<AdminSendResponse, AlertError> {
        let caller = self.authorize(caller_id).await?;

        let mut record = NotificationRecord::try_from(request.record)?;
        if record.sender_name().is_none() {
            record = record.with_sender_name(caller.display_name());
        }

        let audiences = resolve_audiences(&record, &request.target_roles);
        let notification_id = self.store.create(&record, &caller.id).await?;

        info!(
            notification_id = %notification_id,
            caller_id = %caller.id,
            targets = audiences.len(),
            classification = %record.classification(),
            "Admin notification accepted"
        );

        let reports = self
            .dispatcher
            .dispatch_to_audiences(Collection::Notifications, &notification_id, &record, &audiences)
            .await;

        let mut results = Vec::with_capacity(reports.len());
        let mut last_error = None;

        for (audience, report) in audiences.iter().zip(reports) {
            let (message_id, error) = match report.outcome {
                DeliveryOutcome::Sent { message_id } => (Some(message_id), None),
                DeliveryOutcome::Failed { error } => {
                    let message = error.to_string();
                    last_error = Some(error);
                    (None, Some(message))
                }
                DeliveryOutcome::Skipped { previous } => {
                    (None, Some(format!("Delivery already {}", previous.as_str())))
                }
            };

            results.push(TargetResult {
                topic: report.topic,
                role: audience.role().map(str::to_string),
                message_id,
                error,
            });
        }

        let delivered = results.iter().filter(|r| r.message_id.is_some()).count();

        if delivered == 0 {
            let error = last_error
                .unwrap_or_else(|| AlertError::Internal("No delivery targets".to_string()));
            self.set_status(&notification_id, NotificationStatus::Failed, Some(&error.to_string()))
                .await;
            return Err(error);
        }

        if delivered < results.len() {
            warn!(
                notification_id = %notification_id,
                delivered,
                total = results.len(),
                "Admin notification partially delivered"
            );
        }

        self.set_status(&notification_id, NotificationStatus::Sent, None)
            .await;

        Ok(AdminSendResponse {
            notification_id,
            emergency: record.is_emergency(),
            results,
        })
    }

    async fn authorize(&self, caller_id: Option<&str>) -> Result<UserProfile, AlertError> {
        let caller_id = caller_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AlertError::PermissionDenied("Authentication required".to_string()))?;

        let profile = self
            .users
            .get_user(caller_id)
            .await?
            .ok_or_else(|| AlertError::NotFound(format!("User profile {}", caller_id)))?;

        if !profile.is_admin() {
            warn!(caller_id, role = %profile.role, "Non-admin attempted to send notification");
            return Err(AlertError::PermissionDenied(
                "Only admins can send notifications".to_string(),
            ));
        }

        Ok(profile)
    }

    async fn set_status(&self, id: &str, status: NotificationStatus, error: Option<&str>) {
        if let Err(e) = self.store.update_status(id, status, error).await {
            warn!(notification_id = id, status = %status, error = %e, "Failed to update notification status");
        }
    }
}

fn resolve_audiences(record: &NotificationRecord, target_roles: &[String]) -> Vec<Audience> {
    let roles: Vec<&str> = target_roles
        .iter()
        .map(|role| role.trim())
        .filter(|role| !role.is_empty())
        .collect();

    if roles.is_empty() {
        return vec![Audience::from_target_role(record.target_role())];
    }

    roles
        .into_iter()
        .map(|role| Audience::Role(role.to_string()))
        .collect()
}
