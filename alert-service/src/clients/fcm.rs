use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::AlertError,
    models::{
        fcm::{FcmErrorResponse, FcmRequest, FcmResponse},
        outbound::OutboundMessage,
        validation::validate_topic_name,
    },
    publisher::Publisher,
};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AlertError>;
}

pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GcpTokenSource {
    pub async fn discover() -> Result<Self, Error> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| anyhow!("Failed to discover Google credentials: {}", e))?;

        Ok(Self { provider })
    }
}

#[async_trait]
impl AccessTokenSource for GcpTokenSource {
    async fn access_token(&self) -> Result<String, AlertError> {
        let token = self
            .provider
            .token(FCM_SCOPES)
            .await
            .map_err(|e| AlertError::Delivery(format!("Failed to obtain FCM access token: {}", e)))?;

        Ok(token.as_str().to_string())
    }
}

pub struct StaticTokenSource(String);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, AlertError> {
        Ok(self.0.clone())
    }
}

pub struct FcmClient {
    http_client: Client,
    send_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FcmClient {
    pub fn new(config: &Config, tokens: Arc<dyn AccessTokenSource>) -> Result<Self, Error> {
        Self::with_base_url(&config.fcm_base_url, &config.fcm_project_id, tokens)
    }

    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            base_url.trim_end_matches('/'),
            project_id
        );

        info!(project_id, "FCM client initialized");

        Ok(Self {
            http_client,
            send_url,
            tokens,
        })
    }
}

#[async_trait]
impl Publisher for FcmClient {
    async fn publish(&self, message: &OutboundMessage) -> Result<String, AlertError> {
        validate_topic_name(&message.topic)?;

        debug!(topic = %message.topic, "Sending FCM topic message");

        let request = FcmRequest::from(message);
        let token = self.tokens.access_token().await?;

        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AlertError::Delivery(format!("FCM request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let body: FcmResponse = response
                .json()
                .await
                .map_err(|e| AlertError::Delivery(format!("Unreadable FCM response: {}", e)))?;

            debug!(topic = %message.topic, message_id = %body.name, "FCM accepted message");
            return Ok(body.name);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<FcmErrorResponse>(&text) {
            Ok(parsed) => match parsed.error.status {
                Some(code) => format!("{} ({})", parsed.error.message, code),
                None => parsed.error.message,
            },
            Err(_) => text,
        };

        Err(AlertError::Delivery(format!(
            "FCM returned {}: {}",
            status.as_u16(),
            detail
        )))
    }
}
