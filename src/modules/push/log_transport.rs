use async_trait::async_trait;
use uuid::Uuid;

use super::{MulticastReceipt, PushError, PushMessage, PushTransport};

/// Transport that only logs; every delivery is reported as successful
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPushTransport;

#[async_trait]
impl PushTransport for LogPushTransport {
    async fn send_to_tokens(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<MulticastReceipt, PushError> {
        tracing::info!(
            "[push:log] to {} token(s): {} - {}",
            tokens.len(),
            message.title,
            message.body
        );
        Ok(MulticastReceipt {
            success_count: tokens.len(),
            failure_count: 0,
        })
    }

    async fn send_to_topic(&self, topic: &str, message: &PushMessage) -> Result<String, PushError> {
        let message_id = Uuid::now_v7().to_string();
        tracing::info!(
            "[push:log] to topic {} ({}): {} - {}",
            topic,
            message_id,
            message.title,
            message.body
        );
        Ok(message_id)
    }

    async fn subscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        tracing::info!("[push:log] subscribe {} token(s) to {}", tokens.len(), topic);
        Ok(())
    }

    async fn unsubscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        tracing::info!(
            "[push:log] unsubscribe {} token(s) from {}",
            tokens.len(),
            topic
        );
        Ok(())
    }
}
