//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait and the transports the
//! mailer can be started with. Exactly one is built per process.

mod mailersend;
mod mock;
mod smtp;

pub use mailersend::MailerSendProvider;
pub use mock::MockProvider;
pub use smtp::SmtpProvider;

use crate::config::MailConfig;
use crate::error::NotificationResult;
use crate::models::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Trait for email sending providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send one message to all of its recipients.
    async fn send(&self, message: &Message) -> NotificationResult<()>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;
}

/// Build the transport selected by configuration.
///
/// Disabled mail gives the mock provider; otherwise a MailerSend key wins
/// over SMTP. Invalid SMTP parameters are reported here, at startup.
pub fn from_config(config: &MailConfig) -> NotificationResult<Arc<dyn EmailProvider>> {
    let provider: Arc<dyn EmailProvider> = if !config.send_mails {
        Arc::new(MockProvider::new())
    } else if let Some(api_key) = &config.mailersend_api_key {
        Arc::new(MailerSendProvider::new(api_key.clone()))
    } else {
        Arc::new(SmtpProvider::new(
            &config.smtp_host,
            &config.smtp_port,
            &config.smtp_user,
            &config.smtp_pass,
        )?)
    };

    info!(provider = provider.name(), "Mail transport ready");
    Ok(provider)
}
