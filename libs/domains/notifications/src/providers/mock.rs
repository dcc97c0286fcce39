//! Mock email provider used when outbound mail is disabled.

use super::EmailProvider;
use crate::error::NotificationResult;
use crate::models::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Logs and records messages instead of sending them. Never fails.
#[derive(Clone, Default)]
pub struct MockProvider {
    sent_messages: Arc<Mutex<Vec<Message>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded messages
    pub async fn sent_messages(&self) -> Vec<Message> {
        self.sent_messages.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_messages.lock().await.len()
    }

    /// Check if a message was addressed to a specific email
    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_messages
            .lock()
            .await
            .iter()
            .any(|m| m.to().iter().any(|r| r.email == email))
    }
}

#[async_trait]
impl EmailProvider for MockProvider {
    async fn send(&self, message: &Message) -> NotificationResult<()> {
        info!(
            from = %message.from,
            to = %message.recipients_display(),
            subject = %message.subject,
            "Mock email sent"
        );

        self.sent_messages.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_records_messages() {
        let provider = MockProvider::new();

        let mut message = Message::new("Subject", "text", "<p>html</p>");
        message.add_recipient("Ann", "ann@example.org");

        provider.send(&message).await.unwrap();
        provider.send(&message).await.unwrap();

        assert_eq!(provider.sent_count().await, 2);
        assert!(provider.was_sent_to("ann@example.org").await);
        assert!(!provider.was_sent_to("bob@example.org").await);
    }

    #[tokio::test]
    async fn test_mock_provider_accepts_empty_message() {
        let provider = MockProvider::new();
        assert!(provider.send(&Message::default()).await.is_ok());
        assert_eq!(provider.sent_messages().await, vec![Message::default()]);
    }
}
