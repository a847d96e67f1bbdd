use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    builder::PayloadBuilder,
    error::AlertError,
    models::{
        audit::DeliveryLogEntry,
        message::Collection,
        record::NotificationRecord,
        role::Audience,
        status::IdempotencyStatus,
    },
    publisher::Publisher,
    store::{DeliveryLog, IdempotencyStore},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Sent { message_id: String },
    Failed { error: AlertError },
    Skipped { previous: IdempotencyStatus },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub record_id: String,
    pub topic: String,
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    pub fn is_sent(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Sent { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match &self.outcome {
            DeliveryOutcome::Sent { message_id } => Some(message_id),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.outcome,
            DeliveryOutcome::Skipped {
                previous: IdempotencyStatus::Processing
            }
        )
    }
}

pub struct Dispatcher {
    publisher: Arc<dyn Publisher>,
    delivery_log: Arc<dyn DeliveryLog>,
    idempotency: Option<Arc<dyn IdempotencyStore>>,
    builder: PayloadBuilder,
}

impl Dispatcher {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        delivery_log: Arc<dyn DeliveryLog>,
        builder: PayloadBuilder,
    ) -> Self {
        Self {
            publisher,
            delivery_log,
            idempotency: None,
            builder,
        }
    }

    pub fn with_idempotency(mut self, store: Arc<dyn IdempotencyStore>) -> Self {
        self.idempotency = Some(store);
        self
    }

    pub async fn dispatch(
        &self,
        collection: Collection,
        record_id: &str,
        record: NotificationRecord,
    ) -> DeliveryReport {
        match collection {
            Collection::Notifications => self.dispatch_broadcast(record_id, &record).await,
            Collection::RoleNotifications => self.dispatch_role(record_id, &record).await,
            Collection::EmergencyAlerts => self.dispatch_emergency_alert(record_id, record).await,
        }
    }

    pub async fn dispatch_broadcast(
        &self,
        record_id: &str,
        record: &NotificationRecord,
    ) -> DeliveryReport {
        self.deliver(Collection::Notifications, record_id, record, &Audience::Broadcast)
            .await
    }

    pub async fn dispatch_role(&self, record_id: &str, record: &NotificationRecord) -> DeliveryReport {
        let audience = Audience::from_target_role(record.target_role());
        self.deliver(Collection::RoleNotifications, record_id, record, &audience)
            .await
    }

    pub async fn dispatch_emergency_alert(
        &self,
        record_id: &str,
        record: NotificationRecord,
    ) -> DeliveryReport {
        let record = if record.priority().is_none() {
            record.escalated()
        } else if record.is_emergency() {
            record
        } else {
            warn!(
                record_id,
                priority = ?record.priority(),
                "Emergency alert carried a non-emergency priority, overriding"
            );
            record.escalated()
        };

        let audience = Audience::from_target_role(record.target_role());
        self.deliver(Collection::EmergencyAlerts, record_id, &record, &audience)
            .await
    }

    pub async fn dispatch_to_roles(
        &self,
        record_id: &str,
        record: &NotificationRecord,
        roles: &[String],
    ) -> Vec<DeliveryReport> {
        let audiences: Vec<Audience> = roles.iter().cloned().map(Audience::Role).collect();

        self.dispatch_to_audiences(Collection::RoleNotifications, record_id, record, &audiences)
            .await
    }

    pub async fn dispatch_to_audiences(
        &self,
        collection: Collection,
        record_id: &str,
        record: &NotificationRecord,
        audiences: &[Audience],
    ) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(audiences.len());

        for audience in audiences {
            let report = self.deliver(collection, record_id, record, audience).await;
            reports.push(report);
        }

        reports
    }

    async fn publish(
        &self,
        record_id: &str,
        record: &NotificationRecord,
        audience: &Audience,
    ) -> Result<String, AlertError> {
        let topic = audience.topic();
        let message = self.builder.build(record, topic);

        debug!(
            record_id,
            topic,
            classification = %record.classification(),
            channel_id = %message.android.notification.channel_id,
            "Publishing notification"
        );

        match self.publisher.publish(&message).await {
            Ok(message_id) => {
                info!(
                    record_id,
                    topic,
                    message_id = %message_id,
                    classification = %record.classification(),
                    sender_name = record.sender_name().unwrap_or("-"),
                    "Notification delivered"
                );

                self.append_log(DeliveryLogEntry::success(record_id, topic)).await;
                Ok(message_id)
            }
            Err(e) => {
                error!(
                    record_id,
                    topic,
                    title = %record.title(),
                    target_role = record.target_role().unwrap_or("-"),
                    error = %e,
                    "Failed to deliver notification"
                );

                self.append_log(DeliveryLogEntry::failure(record_id, topic, e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    async fn deliver(
        &self,
        collection: Collection,
        record_id: &str,
        record: &NotificationRecord,
        audience: &Audience,
    ) -> DeliveryReport {
        let topic = audience.topic();
        let key = format!("{}:{}:{}", collection, record_id, topic);

        if let Some(previous) = self.claim(&key).await {
            info!(
                record_id,
                topic,
                previous = previous.as_str(),
                "Record already handled, skipping duplicate delivery"
            );

            return DeliveryReport {
                record_id: record_id.to_string(),
                topic: topic.to_string(),
                outcome: DeliveryOutcome::Skipped { previous },
            };
        }

        let outcome = match self.publish(record_id, record, audience).await {
            Ok(message_id) => {
                self.settle(&key, true).await;
                DeliveryOutcome::Sent { message_id }
            }
            Err(error) => {
                self.settle(&key, false).await;
                DeliveryOutcome::Failed { error }
            }
        };

        DeliveryReport {
            record_id: record_id.to_string(),
            topic: topic.to_string(),
            outcome,
        }
    }

    // A failing store lets the send through.
    async fn claim(&self, key: &str) -> Option<IdempotencyStatus> {
        let store = self.idempotency.as_ref()?;

        match store.claim(key).await {
            Ok(IdempotencyStatus::NotFound) | Ok(IdempotencyStatus::Failed) => None,
            Ok(previous) => Some(previous),
            Err(e) => {
                warn!(key, error = %e, "Idempotency check failed, sending anyway");
                None
            }
        }
    }

    async fn settle(&self, key: &str, sent: bool) {
        let Some(store) = self.idempotency.as_ref() else {
            return;
        };

        let result = if sent {
            store.mark_sent(key).await
        } else {
            store.mark_failed(key).await
        };

        if let Err(e) = result {
            warn!(key, error = %e, "Failed to update idempotency status");
        }
    }

    async fn append_log(&self, entry: DeliveryLogEntry) {
        if let Err(e) = self.delivery_log.append(&entry).await {
            warn!(
                record_id = %entry.record_id,
                target = %entry.target,
                error = %e,
                "Failed to write delivery log"
            );
        }
    }
}
