//! Error types for the notifications domain.

use crate::api::ApiError;
use crate::i18n::TranslationError;
use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while turning an event into emails.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Domain API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The recipient's language cannot be served.
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// A transfer side has no matching member in the fetched batch.
    #[error("{role} member for account {account} not found")]
    MemberNotFound { role: &'static str, account: String },

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    TemplateError(String),

    /// Mail transport failed to deliver a message.
    #[error("error sending email to {recipients}: {source}")]
    Send {
        recipients: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl NotificationError {
    /// Wrap a transport error together with the recipients it was meant for.
    pub fn send<E>(recipients: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        NotificationError::Send {
            recipients: recipients.into(),
            source: source.into(),
        }
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_not_found_names_the_side() {
        let err = NotificationError::MemberNotFound {
            role: "payee",
            account: "acc-2".to_string(),
        };
        assert_eq!(err.to_string(), "payee member for account acc-2 not found");
    }

    #[test]
    fn test_send_error_lists_recipients() {
        let err = NotificationError::send("[Ann <ann@example.org>]", "connection refused");
        assert_eq!(
            err.to_string(),
            "error sending email to [Ann <ann@example.org>]: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
