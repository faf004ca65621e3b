use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Payload delivered to devices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Per-token outcome of a multicast send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MulticastReceipt {
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push gateway request failed: {0}")]
    Request(String),

    #[error("Push gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid push gateway response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send to explicit device tokens; individual token failures are counted,
    /// not raised
    async fn send_to_tokens(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<MulticastReceipt, PushError>;

    /// Publish to a topic, returning the gateway's message id
    async fn send_to_topic(&self, topic: &str, message: &PushMessage) -> Result<String, PushError>;

    async fn subscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError>;

    async fn unsubscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError>;
}
