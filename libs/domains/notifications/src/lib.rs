//! Notifications Domain
//!
//! Turns platform events into localized notification emails.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Redis Stream   │  ← platform events (event-stream crate)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │     Mailer      │  ← one event at a time, always acknowledged
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ EventDispatcher │  ← event kind → Notifier operation
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │    Notifier     │  ← resolve resources, render per recipient language
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Email Provider  │  ← MailerSend, SMTP or mock
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{
//!     EventDispatcher, Mailer, MailSettings, MailerConfig, MailerMetrics, Notifier,
//!     api::HttpApiClient, providers,
//! };
//!
//! let config = MailerConfig::from_env()?;
//! let provider = providers::from_config(&config.mail)?;
//! let api = Arc::new(HttpApiClient::new(&config.social_url, config.api_token.clone()));
//! let metrics = MailerMetrics::new(&config.stream_name);
//!
//! let settings = MailSettings::from_config(&config);
//! let notifier = Notifier::new(api, provider, settings, metrics.clone())?;
//! let mailer = Mailer::new(stream, Arc::new(EventDispatcher::new(notifier)), metrics);
//! mailer.run(shutdown_rx).await?;
//! ```

pub mod address;
pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod mailer;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod resolver;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use address::parse_email_address;
pub use config::{MailConfig, MailerConfig};
pub use dispatcher::{EventDispatcher, EventHandler};
pub use error::{NotificationError, NotificationResult};
pub use handlers::{MailSettings, Notifier};
pub use mailer::Mailer;
pub use metrics::{MailerMetrics, init_metrics};
pub use models::{Message, Recipient};
pub use providers::{EmailProvider, MailerSendProvider, MockProvider, SmtpProvider};
pub use resolver::ResourceResolver;
pub use templates::TemplateEngine;
