use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use alert_service::{
    admin::AdminSender,
    builder::PayloadBuilder,
    dispatcher::Dispatcher,
    error::AlertError,
    models::{
        audit::DeliveryLogEntry,
        outbound::OutboundMessage,
        record::NotificationRecord,
        status::{IdempotencyStatus, NotificationStatus},
        user::UserProfile,
    },
    publisher::Publisher,
    store::{DeliveryLog, IdempotencyStore, NotificationStore, UserDirectory},
};
use async_trait::async_trait;

/// Publisher that records every message and fails for selected topics.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<OutboundMessage>>,
    failing_topics: Mutex<HashSet<String>>,
}

impl RecordingPublisher {
    pub fn failing_on(topics: &[&str]) -> Self {
        let publisher = Self::default();
        publisher
            .failing_topics
            .lock()
            .unwrap()
            .extend(topics.iter().map(|t| t.to_string()));
        publisher
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.topic).collect()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, message: &OutboundMessage) -> Result<String, AlertError> {
        self.sent.lock().unwrap().push(message.clone());

        if self.failing_topics.lock().unwrap().contains(&message.topic) {
            return Err(AlertError::Delivery(format!(
                "FCM returned 503: topic {} unavailable",
                message.topic
            )));
        }

        Ok(format!("projects/demo/messages/{}", message.topic))
    }
}

#[derive(Default)]
pub struct MemoryDeliveryLog {
    entries: Mutex<Vec<DeliveryLogEntry>>,
}

impl MemoryDeliveryLog {
    pub fn entries(&self) -> Vec<DeliveryLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryLog for MemoryDeliveryLog {
    async fn append(&self, entry: &DeliveryLogEntry) -> Result<(), AlertError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredNotification {
    pub record: NotificationRecord,
    pub created_by: String,
    pub status: NotificationStatus,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct MemoryNotificationStore {
    rows: Mutex<Vec<StoredNotification>>,
}

impl MemoryNotificationStore {
    pub fn rows(&self) -> Vec<StoredNotification> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(
        &self,
        record: &NotificationRecord,
        created_by: &str,
    ) -> Result<String, AlertError> {
        let mut rows = self.rows.lock().unwrap();
        rows.push(StoredNotification {
            record: record.clone(),
            created_by: created_by.to_string(),
            status: NotificationStatus::Sending,
            error: None,
        });

        Ok(format!("notification-{}", rows.len()))
    }

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        error: Option<&str>,
    ) -> Result<(), AlertError> {
        let index = id
            .strip_prefix("notification-")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(index - 1)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;

        row.status = status;
        row.error = error.map(str::to_string);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: HashMap<String, UserProfile>,
    unavailable: bool,
}

impl MemoryUserDirectory {
    pub fn with_user(mut self, id: &str, role: &str, full_name: Option<&str>) -> Self {
        self.users.insert(
            id.to_string(),
            UserProfile {
                id: id.to_string(),
                role: role.to_string(),
                full_name: full_name.map(str::to_string),
                name: None,
                email: None,
            },
        );
        self
    }

    pub fn unavailable() -> Self {
        Self {
            users: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_user(&self, id: &str) -> Result<Option<UserProfile>, AlertError> {
        if self.unavailable {
            return Err(AlertError::Internal("Database error: connection reset".to_string()));
        }

        Ok(self.users.get(id).cloned())
    }
}

/// Idempotency keys in memory. Processing claims expire after `lease`.
pub struct MemoryIdempotencyStore {
    keys: Mutex<HashMap<String, (IdempotencyStatus, Instant)>>,
    lease: Duration,
}

impl Default for MemoryIdempotencyStore {
    fn default() -> Self {
        Self::with_lease(Duration::from_secs(30))
    }
}

impl MemoryIdempotencyStore {
    pub fn with_lease(lease: Duration) -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            lease,
        }
    }

    pub fn status(&self, key: &str) -> IdempotencyStatus {
        self.keys
            .lock()
            .unwrap()
            .get(key)
            .map(|(status, _)| *status)
            .unwrap_or(IdempotencyStatus::NotFound)
    }

    fn set(&self, key: &str, status: IdempotencyStatus) {
        self.keys
            .lock()
            .unwrap()
            .insert(key.to_string(), (status, Instant::now()));
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn claim(&self, key: &str) -> Result<IdempotencyStatus, AlertError> {
        let mut keys = self.keys.lock().unwrap();
        let previous = match keys.get(key) {
            Some((IdempotencyStatus::Processing, claimed_at))
                if claimed_at.elapsed() >= self.lease =>
            {
                IdempotencyStatus::NotFound
            }
            Some((status, _)) => *status,
            None => IdempotencyStatus::NotFound,
        };

        if matches!(previous, IdempotencyStatus::NotFound | IdempotencyStatus::Failed) {
            keys.insert(
                key.to_string(),
                (IdempotencyStatus::Processing, Instant::now()),
            );
        }

        Ok(previous)
    }

    async fn mark_sent(&self, key: &str) -> Result<(), AlertError> {
        self.set(key, IdempotencyStatus::Sent);
        Ok(())
    }

    async fn mark_failed(&self, key: &str) -> Result<(), AlertError> {
        self.set(key, IdempotencyStatus::Failed);
        Ok(())
    }
}

pub struct Harness {
    pub publisher: Arc<RecordingPublisher>,
    pub log: Arc<MemoryDeliveryLog>,
    pub idempotency: Arc<MemoryIdempotencyStore>,
    pub store: Arc<MemoryNotificationStore>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new(publisher: RecordingPublisher) -> Self {
        Self::with_idempotency(publisher, MemoryIdempotencyStore::default())
    }

    pub fn with_idempotency(publisher: RecordingPublisher, idempotency: MemoryIdempotencyStore) -> Self {
        let publisher = Arc::new(publisher);
        let log = Arc::new(MemoryDeliveryLog::default());
        let idempotency = Arc::new(idempotency);

        let dispatcher = Dispatcher::new(publisher.clone(), log.clone(), PayloadBuilder::default())
            .with_idempotency(idempotency.clone());

        Self {
            publisher,
            log,
            idempotency,
            store: Arc::new(MemoryNotificationStore::default()),
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn admin(&self, users: MemoryUserDirectory) -> AdminSender {
        AdminSender::new(self.dispatcher.clone(), Arc::new(users), self.store.clone())
    }
}

pub fn admin_directory() -> MemoryUserDirectory {
    MemoryUserDirectory::default()
        .with_user("admin-1", "admin", Some("Komandan Satu"))
        .with_user("member-1", "pasGegana", Some("Anggota"))
}
