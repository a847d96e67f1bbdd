use std::time::Duration;

use alert_service::{
    dispatcher::DeliveryOutcome,
    models::{message::Collection, record::NotificationRecord, status::IdempotencyStatus},
    store::IdempotencyStore,
};
use anyhow::Result;

use crate::support::{Harness, MemoryIdempotencyStore, RecordingPublisher};

fn record(title: &str) -> NotificationRecord {
    NotificationRecord::new(title, "Details follow").unwrap()
}

/// Test: Generic notifications go to the broadcast topic
#[tokio::test]
async fn test_notifications_collection_broadcasts() {
    let harness = Harness::new(RecordingPublisher::default());

    let report = harness
        .dispatcher
        .dispatch(
            Collection::Notifications,
            "n1",
            record("Meeting").with_target_role("makoKor"),
        )
        .await;

    assert!(report.is_sent());
    assert_eq!(report.topic, "all_users");
    assert_eq!(report.message_id(), Some("projects/demo/messages/all_users"));
    assert_eq!(harness.publisher.topics(), vec!["all_users"]);

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].success);
    assert_eq!(entries[0].record_id, "n1");
    assert_eq!(entries[0].target, "all_users");
}

/// Test: Role notifications resolve their topic from the target role
#[tokio::test]
async fn test_role_notification_uses_role_topic() {
    let harness = Harness::new(RecordingPublisher::default());

    let known = harness
        .dispatcher
        .dispatch_role("r1", &record("Briefing").with_target_role("pasbrimobII"))
        .await;
    let unknown = harness
        .dispatcher
        .dispatch_role("r2", &record("Briefing").with_target_role("satpam"))
        .await;
    let missing = harness.dispatcher.dispatch_role("r3", &record("Briefing")).await;

    assert_eq!(known.topic, "pasbrimob_ii_users");
    assert_eq!(unknown.topic, "other_users");
    assert_eq!(missing.topic, "all_users");
}

/// Test: A failed publish is reported and logged, never raised
#[tokio::test]
async fn test_failed_publish_writes_failure_log() {
    let harness = Harness::new(RecordingPublisher::failing_on(&["all_users"]));

    let report = harness
        .dispatcher
        .dispatch_broadcast("n2", &record("Meeting"))
        .await;

    match &report.outcome {
        DeliveryOutcome::Failed { error } => {
            assert!(error.to_string().contains("503"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].success);
    assert!(entries[0].error.as_deref().unwrap_or_default().contains("503"));
    assert_eq!(
        harness.idempotency.status("notifications:n2:all_users"),
        IdempotencyStatus::Failed
    );
}

/// Test: A redelivered creation event is not published twice
#[tokio::test]
async fn test_duplicate_delivery_is_skipped() {
    let harness = Harness::new(RecordingPublisher::default());

    let first = harness
        .dispatcher
        .dispatch(Collection::Notifications, "n3", record("Meeting"))
        .await;
    let second = harness
        .dispatcher
        .dispatch(Collection::Notifications, "n3", record("Meeting"))
        .await;

    assert!(first.is_sent());
    assert_eq!(
        second.outcome,
        DeliveryOutcome::Skipped {
            previous: IdempotencyStatus::Sent
        }
    );
    assert_eq!(harness.publisher.sent().len(), 1);
    assert_eq!(harness.log.entries().len(), 1);
}

/// Test: A failed delivery can be picked up again on redelivery
#[tokio::test]
async fn test_failed_delivery_is_reclaimed() {
    let harness = Harness::new(RecordingPublisher::failing_on(&["all_users"]));

    harness
        .dispatcher
        .dispatch(Collection::Notifications, "n4", record("Meeting"))
        .await;
    let retry = harness
        .dispatcher
        .dispatch(Collection::Notifications, "n4", record("Meeting"))
        .await;

    assert!(matches!(retry.outcome, DeliveryOutcome::Failed { .. }));
    assert_eq!(harness.publisher.sent().len(), 2);
}

/// Test: A claim left behind by a crashed worker is taken over once its lease ends
#[tokio::test]
async fn test_expired_claim_is_redelivered() -> Result<()> {
    let harness = Harness::with_idempotency(
        RecordingPublisher::default(),
        MemoryIdempotencyStore::with_lease(Duration::ZERO),
    );
    harness
        .idempotency
        .claim("emergency_alerts:e9:all_users")
        .await?;

    let report = harness
        .dispatcher
        .dispatch(
            Collection::EmergencyAlerts,
            "e9",
            record("Flood").with_kind("urgent"),
        )
        .await;

    assert!(report.is_sent());
    assert_eq!(harness.publisher.sent().len(), 1);
    assert_eq!(harness.log.entries().len(), 1);
    assert_eq!(
        harness.idempotency.status("emergency_alerts:e9:all_users"),
        IdempotencyStatus::Sent
    );

    Ok(())
}

/// Test: A live claim reports the delivery as still in flight
#[tokio::test]
async fn test_claim_within_lease_is_in_flight() -> Result<()> {
    let harness = Harness::new(RecordingPublisher::default());
    harness
        .idempotency
        .claim("emergency_alerts:e10:all_users")
        .await?;

    let report = harness
        .dispatcher
        .dispatch(
            Collection::EmergencyAlerts,
            "e10",
            record("Flood").with_kind("urgent"),
        )
        .await;

    assert_eq!(
        report.outcome,
        DeliveryOutcome::Skipped {
            previous: IdempotencyStatus::Processing
        }
    );
    assert!(report.is_in_flight());
    assert!(harness.publisher.sent().is_empty());

    Ok(())
}

/// Test: The same record id in different collections is not a duplicate
#[tokio::test]
async fn test_duplicate_guard_is_scoped_by_collection() {
    let harness = Harness::new(RecordingPublisher::default());

    harness
        .dispatcher
        .dispatch(Collection::Notifications, "shared", record("Meeting"))
        .await;
    let report = harness
        .dispatcher
        .dispatch(Collection::EmergencyAlerts, "shared", record("Meeting"))
        .await;

    assert!(report.is_sent());
    assert_eq!(harness.publisher.sent().len(), 2);
}

/// Test: Emergency alerts are always sent as emergencies
#[tokio::test]
async fn test_emergency_alert_forces_emergency_priority() {
    let harness = Harness::new(RecordingPublisher::default());

    let plain = harness
        .dispatcher
        .dispatch_emergency_alert("e1", record("Flood").with_target_role("pasGegana"))
        .await;
    let downgraded = harness
        .dispatcher
        .dispatch_emergency_alert("e2", record("Flood").with_priority("normal"))
        .await;

    assert_eq!(plain.topic, "pas_gegana_users");
    assert_eq!(downgraded.topic, "all_users");

    for message in harness.publisher.sent() {
        assert_eq!(message.data["priority"], "emergency");
        assert_eq!(message.android.notification.channel_id, "emergency_channel");
        assert_eq!(message.data["senderName"], "Emergency System");
    }
}

/// Test: Multi-role sends continue past a failing role
#[tokio::test]
async fn test_multi_role_send_continues_after_failure() {
    let harness = Harness::new(RecordingPublisher::failing_on(&["mako_kor_users"]));
    let roles = vec![
        "admin".to_string(),
        "makoKor".to_string(),
        "pasPelopor".to_string(),
    ];

    let reports = harness
        .dispatcher
        .dispatch_to_roles("m1", &record("Roll call").with_kind("urgent"), &roles)
        .await;

    let topics: Vec<&str> = reports.iter().map(|r| r.topic.as_str()).collect();
    assert_eq!(topics, vec!["admin_users", "mako_kor_users", "pas_pelopor_users"]);
    assert!(reports[0].is_sent());
    assert!(!reports[1].is_sent());
    assert!(reports[2].is_sent());

    let outcomes: Vec<bool> = harness.log.entries().iter().map(|e| e.success).collect();
    assert_eq!(outcomes, vec![true, false, true]);
}
