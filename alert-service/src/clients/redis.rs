use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::MultiplexedConnection};
use tracing::{debug, info};

use crate::{
    config::Config, error::AlertError, models::status::IdempotencyStatus,
    store::IdempotencyStore,
};

// Takes the key unless it is processing or sent, and returns the previous
// value ("" when absent). A processing claim expires with its lease.
const CLAIM_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == 'processing' or current == 'sent' then
    return current
end
redis.call('SET', KEYS[1], 'processing', 'EX', ARGV[1])
if current then
    return current
end
return ''
"#;

pub struct RedisIdempotencyStore {
    connection: MultiplexedConnection,
    claim_script: Script,
    idempotency_ttl_seconds: u64,
    processing_lease_seconds: u64,
}

impl RedisIdempotencyStore {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        info!("Connecting to Redis");

        let client = Client::open(config.redis_url.as_str())
            .map_err(|_| anyhow!("Failed to create redis client"))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|_| anyhow!("Failed to connect to redis client"))?;

        info!("Redis connection established");

        Ok(Self {
            connection,
            claim_script: Script::new(CLAIM_SCRIPT),
            idempotency_ttl_seconds: config.idempotency_ttl_seconds,
            processing_lease_seconds: config.processing_lease_seconds,
        })
    }

    fn key(idempotency_key: &str) -> String {
        format!("idempotency:{}", idempotency_key)
    }

    async fn set_status(&self, idempotency_key: &str, status: &str) -> Result<(), AlertError> {
        let mut connection = self.connection.clone();

        connection
            .set_ex::<_, _, ()>(
                Self::key(idempotency_key),
                status,
                self.idempotency_ttl_seconds,
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn claim(&self, idempotency_key: &str) -> Result<IdempotencyStatus, AlertError> {
        let mut connection = self.connection.clone();

        let previous: String = self
            .claim_script
            .key(Self::key(idempotency_key))
            .arg(self.processing_lease_seconds)
            .invoke_async(&mut connection)
            .await?;

        let status = IdempotencyStatus::from_value(Some(previous.as_str()));

        debug!(
            idempotency_key,
            previous = previous.as_str(),
            "Idempotency claim evaluated"
        );

        Ok(status)
    }

    async fn mark_sent(&self, idempotency_key: &str) -> Result<(), AlertError> {
        self.set_status(idempotency_key, "sent").await
    }

    async fn mark_failed(&self, idempotency_key: &str) -> Result<(), AlertError> {
        self.set_status(idempotency_key, "failed").await
    }
}
