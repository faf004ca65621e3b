use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MulticastReceipt, PushError, PushMessage, PushTransport};

/// Token prefix the recording transport reports as undeliverable
pub const INVALID_TOKEN_PREFIX: &str = "invalid-";

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedPush {
    Tokens {
        tokens: Vec<String>,
        message: PushMessage,
    },
    Topic {
        topic: String,
        message: PushMessage,
    },
    Subscribe {
        topic: String,
        tokens: Vec<String>,
    },
    Unsubscribe {
        topic: String,
        tokens: Vec<String>,
    },
}

/// In-memory transport for tests; records every call and fails on demand
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<RecordedPush>>,
    failing_topics: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later send or subscription touching `topic` fails
    pub fn fail_topic(&self, topic: &str) {
        self.failing_topics.lock().unwrap().insert(topic.to_string());
    }

    pub fn sent(&self) -> Vec<RecordedPush> {
        self.sent.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|p| match p {
                RecordedPush::Topic { topic, .. } => Some(topic),
                _ => None,
            })
            .collect()
    }

    fn check(&self, topic: &str) -> Result<(), PushError> {
        if self.failing_topics.lock().unwrap().contains(topic) {
            return Err(PushError::Rejected {
                status: 503,
                message: format!("topic {} unavailable", topic),
            });
        }
        Ok(())
    }

    fn record(&self, push: RecordedPush) {
        self.sent.lock().unwrap().push(push);
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn send_to_tokens(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<MulticastReceipt, PushError> {
        let failure_count = tokens
            .iter()
            .filter(|t| t.starts_with(INVALID_TOKEN_PREFIX))
            .count();
        self.record(RecordedPush::Tokens {
            tokens: tokens.to_vec(),
            message: message.clone(),
        });
        Ok(MulticastReceipt {
            success_count: tokens.len() - failure_count,
            failure_count,
        })
    }

    async fn send_to_topic(&self, topic: &str, message: &PushMessage) -> Result<String, PushError> {
        self.check(topic)?;
        self.record(RecordedPush::Topic {
            topic: topic.to_string(),
            message: message.clone(),
        });
        Ok(format!("msg-{}", topic))
    }

    async fn subscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        self.check(topic)?;
        self.record(RecordedPush::Subscribe {
            topic: topic.to_string(),
            tokens: tokens.to_vec(),
        });
        Ok(())
    }

    async fn unsubscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        self.check(topic)?;
        self.record(RecordedPush::Unsubscribe {
            topic: topic.to_string(),
            tokens: tokens.to_vec(),
        });
        Ok(())
    }
}
