//! SMTP email provider implementation using lettre.

use super::EmailProvider;
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Message, Recipient};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::{Credentials, Mechanism},
};
use std::time::Duration;
use tracing::{debug, error, info};

/// Upper bound for a whole send, connection included.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// SMTP email provider.
///
/// Requires STARTTLS and authenticates with PLAIN.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl SmtpProvider {
    /// Create a new SMTP provider. `port` is validated here.
    pub fn new(host: &str, port: &str, username: &str, password: &str) -> NotificationResult<Self> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| {
                NotificationError::ConfigError(format!("invalid SMTP port '{}': {}", port, e))
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| {
                NotificationError::ConfigError(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .authentication(vec![Mechanism::Plain])
            .timeout(Some(SEND_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            host: host.to_string(),
            port,
        })
    }

    /// Build a lettre Message with both bodies.
    fn build_message(&self, message: &Message) -> NotificationResult<lettre::Message> {
        let recipients = message.recipients_display();
        let invalid = |e: lettre::address::AddressError| NotificationError::send(&recipients, e);

        let mut builder = lettre::Message::builder()
            .from(mailbox(&message.from).map_err(invalid)?)
            .subject(&message.subject);
        for recipient in message.to() {
            builder = builder.to(mailbox(recipient).map_err(invalid)?);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.body_html.clone()),
                    ),
            )
            .map_err(|e| NotificationError::send(recipients, e))
    }
}

fn mailbox(recipient: &Recipient) -> Result<Mailbox, lettre::address::AddressError> {
    let name = (!recipient.name.is_empty()).then(|| recipient.name.clone());
    Ok(Mailbox::new(name, recipient.email.parse()?))
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, message: &Message) -> NotificationResult<()> {
        let recipients = message.recipients_display();
        debug!(
            to = %recipients,
            subject = %message.subject,
            host = %self.host,
            port = %self.port,
            "Sending email via SMTP"
        );

        let email = self.build_message(message)?;

        let result = tokio::time::timeout(SEND_TIMEOUT, self.transport.send(email)).await;
        match result {
            Ok(Ok(_)) => {
                info!(to = %recipients, "Email sent via SMTP");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(to = %recipients, error = %e, "Failed to send email via SMTP");
                Err(NotificationError::send(recipients, e))
            }
            Err(elapsed) => {
                error!(to = %recipients, "SMTP send timed out");
                Err(NotificationError::send(recipients, elapsed))
            }
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
