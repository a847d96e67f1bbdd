use async_trait::async_trait;

use crate::{error::AlertError, models::outbound::OutboundMessage};

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &OutboundMessage) -> Result<String, AlertError>;
}
