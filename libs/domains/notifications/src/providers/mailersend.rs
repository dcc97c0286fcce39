//! MailerSend email provider implementation.

use super::EmailProvider;
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Message, Recipient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const MAILERSEND_API_URL: &str = "https://api.mailersend.com/v1/email";

/// MailerSend email provider.
pub struct MailerSendProvider {
    api_key: String,
    api_url: String,
    client: Client,
}

impl MailerSendProvider {
    /// Create a new MailerSend provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: MAILERSEND_API_URL.to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Override the API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

// MailerSend API request/response structures

#[derive(Debug, Serialize)]
struct MailerSendRequest<'a> {
    from: EmailAddress<'a>,
    to: Vec<EmailAddress<'a>>,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Recipient> for EmailAddress<'a> {
    fn from(recipient: &'a Recipient) -> Self {
        Self {
            email: &recipient.email,
            name: (!recipient.name.is_empty()).then_some(recipient.name.as_str()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MailerSendError {
    message: String,
}

fn build_request(message: &Message) -> MailerSendRequest<'_> {
    MailerSendRequest {
        from: EmailAddress::from(&message.from),
        to: message.to().iter().map(EmailAddress::from).collect(),
        subject: &message.subject,
        text: &message.body_text,
        html: &message.body_html,
    }
}

#[async_trait]
impl EmailProvider for MailerSendProvider {
    async fn send(&self, message: &Message) -> NotificationResult<()> {
        let recipients = message.recipients_display();
        debug!(to = %recipients, subject = %message.subject, "Sending email via MailerSend");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&build_request(message))
            .send()
            .await
            .map_err(|e| NotificationError::send(&recipients, e))?;

        let status = response.status();
        if status.is_success() {
            info!(to = %recipients, "Email sent via MailerSend");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(
            to = %recipients,
            status = %status,
            error = %error_body,
            "Failed to send email via MailerSend"
        );

        // Try to parse the error response
        let error_message = serde_json::from_str::<MailerSendError>(&error_body)
            .map(|e| e.message)
            .unwrap_or(error_body);

        Err(NotificationError::send(
            recipients,
            format!("MailerSend error ({}): {}", status, error_message),
        ))
    }

    fn name(&self) -> &'static str {
        "mailersend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let mut message = Message::new("Payment received", "text", "<p>html</p>");
        message.from = Recipient::new("Komunitin", "noreply@example.org");
        message.add_recipient("", "ann@example.org");

        let body = serde_json::to_value(build_request(&message)).unwrap();
        assert_eq!(
            body,
            json!({
                "from": { "email": "noreply@example.org", "name": "Komunitin" },
                "to": [{ "email": "ann@example.org" }],
                "subject": "Payment received",
                "text": "text",
                "html": "<p>html</p>"
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_names_recipients() {
        let provider = MailerSendProvider::new("key").with_api_url("http://127.0.0.1:9/email");
        let mut message = Message::new("Subject", "text", "html");
        message.add_recipient("Ann", "ann@example.org");

        let err = provider.send(&message).await.unwrap_err();
        assert!(err.to_string().contains("Ann <ann@example.org>"));
    }
}
