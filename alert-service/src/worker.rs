use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result};
use futures_util::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{
    clients::rbmq::RabbitMqClient,
    dispatcher::{DeliveryOutcome, DeliveryReport, Dispatcher},
    error::AlertError,
    models::{message::{Collection, RecordCreated}, record::NotificationRecord},
};

const REQUEUE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Requeue,
    Discard,
}

// Only a malformed event is an error. Delivery failures are part of the report.
pub async fn process_payload(
    collection: Collection,
    payload: &[u8],
    dispatcher: &Dispatcher,
) -> Result<DeliveryReport, AlertError> {
    let event = serde_json::from_slice::<RecordCreated>(payload)
        .map_err(|e| AlertError::Validation(format!("Malformed {} event: {}", collection, e)))?;

    let record = NotificationRecord::try_from(event.data).map_err(|e| {
        warn!(
            collection = %collection,
            record_id = %event.id,
            error = %e,
            "Rejecting invalid record"
        );
        e
    })?;

    debug!(
        collection = %collection,
        record_id = %event.id,
        classification = %record.classification(),
        "Processing created record"
    );

    Ok(dispatcher.dispatch(collection, &event.id, record).await)
}

// A delivery still held by another claim comes back until that claim settles
// or its lease runs out.
pub fn disposition(result: &Result<DeliveryReport, AlertError>) -> Disposition {
    match result {
        Ok(report) if report.is_in_flight() => Disposition::Requeue,
        Ok(_) => Disposition::Ack,
        Err(_) => Disposition::Discard,
    }
}

pub async fn run_consumer(
    rabbitmq: Arc<RabbitMqClient>,
    collection: Collection,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), Error> {
    let mut consumer = rabbitmq.create_consumer(collection).await?;

    info!(collection = %collection, "Worker started, waiting for records");

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(collection = %collection, error = %e, "Failed to receive message");
                continue;
            }
        };

        let delivery_tag = delivery.delivery_tag;

        let result = process_payload(collection, &delivery.data, &dispatcher).await;

        match &result {
            Ok(report) => {
                if let DeliveryOutcome::Failed { error } = &report.outcome {
                    debug!(
                        collection = %collection,
                        record_id = %report.record_id,
                        topic = %report.topic,
                        error = %error,
                        "Delivery failed, not retrying"
                    );
                }
            }
            Err(e) => {
                warn!(collection = %collection, error = %e, "Discarding unprocessable message");
            }
        }

        match disposition(&result) {
            Disposition::Ack => {
                if let Err(e) = rabbitmq.acknowledge(delivery_tag).await {
                    error!(delivery_tag, error = %e, "Failed to acknowledge message");
                }
            }
            Disposition::Requeue => {
                debug!(collection = %collection, delivery_tag, "Delivery in flight elsewhere, requeueing");
                sleep(REQUEUE_DELAY).await;

                if let Err(e) = rabbitmq.reject(delivery_tag, true).await {
                    error!(delivery_tag, error = %e, "Failed to requeue message");
                }
            }
            Disposition::Discard => {
                if let Err(e) = rabbitmq.reject(delivery_tag, false).await {
                    error!(delivery_tag, error = %e, "Failed to reject message");
                }
            }
        }
    }

    warn!(collection = %collection, "Consumer stream ended");
    Ok(())
}
