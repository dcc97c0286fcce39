//! Mailer configuration, loaded once from the environment.

use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse, env_required};
use event_stream::StreamConfig;

/// Transport selection inputs.
///
/// Kept as raw strings: the SMTP port is only validated when the SMTP
/// transport is actually built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailConfig {
    pub send_mails: bool,
    pub mailersend_api_key: Option<String>,
    pub smtp_host: String,
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
}

impl FromEnv for MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            send_mails: env_or_default("SEND_MAILS", "false") == "true",
            mailersend_api_key: env_optional("MAILERSEND_API_KEY"),
            smtp_host: env_or_default("SMTP_HOST", ""),
            smtp_port: env_or_default("SMTP_PORT", ""),
            smtp_user: env_or_default("SMTP_USER", ""),
            smtp_pass: env_or_default("SMTP_PASS", ""),
        })
    }
}

/// Complete mailer configuration.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub redis_url: String,
    pub stream_name: String,
    pub consumer_group: String,
    pub block_timeout_ms: u64,

    /// Base URL of the social API
    pub social_url: String,
    /// Web app URL used to build links
    pub app_url: String,
    pub api_token: Option<String>,

    pub mail: MailConfig,

    /// Sender address, `Name <email>` or bare
    pub app_email: String,
    /// Recipient of group requests
    pub admin_email: String,

    pub metrics_port: Option<u16>,
}

impl FromEnv for MailerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let metrics_port = match env_optional("METRICS_PORT") {
            Some(_) => Some(env_parse("METRICS_PORT", 0u16)?),
            None => None,
        };

        Ok(Self {
            redis_url: env_required("NOTIFICATIONS_REDIS_URL")?,
            stream_name: env_or_default("NOTIFICATIONS_STREAM", "events"),
            consumer_group: env_or_default("NOTIFICATIONS_CONSUMER_GROUP", "mailer"),
            block_timeout_ms: env_parse("NOTIFICATIONS_BLOCK_MS", 5000)?,
            social_url: env_required("KOMUNITIN_SOCIAL_URL")?,
            app_url: env_or_default("KOMUNITIN_APP_URL", ""),
            api_token: env_optional("KOMUNITIN_API_TOKEN"),
            mail: MailConfig::from_env()?,
            app_email: env_required("APP_EMAIL")?,
            admin_email: env_required("ADMIN_EMAIL")?,
            metrics_port,
        })
    }
}

impl MailerConfig {
    /// Stream consumer settings.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new(&self.redis_url, &self.stream_name, &self.consumer_group)
            .with_block_timeout_ms(self.block_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 4] = [
        ("NOTIFICATIONS_REDIS_URL", Some("redis://127.0.0.1:6379")),
        ("KOMUNITIN_SOCIAL_URL", Some("https://social.example.org")),
        ("APP_EMAIL", Some("Komunitin <noreply@example.org>")),
        ("ADMIN_EMAIL", Some("admin@example.org")),
    ];

    const OPTIONAL: [&str; 12] = [
        "NOTIFICATIONS_STREAM",
        "NOTIFICATIONS_CONSUMER_GROUP",
        "NOTIFICATIONS_BLOCK_MS",
        "KOMUNITIN_APP_URL",
        "KOMUNITIN_API_TOKEN",
        "SEND_MAILS",
        "MAILERSEND_API_KEY",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_USER",
        "SMTP_PASS",
        "METRICS_PORT",
    ];

    fn with_env<F: FnOnce()>(extra: &[(&'static str, Option<&'static str>)], f: F) {
        let mut vars: Vec<(&str, Option<&str>)> = REQUIRED.to_vec();
        vars.extend(OPTIONAL.iter().map(|key| (*key, None)));
        vars.retain(|(key, _)| !extra.iter().any(|(k, _)| k == key));
        vars.extend_from_slice(extra);
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_defaults() {
        with_env(&[], || {
            let config = MailerConfig::from_env().unwrap();
            assert_eq!(config.stream_name, "events");
            assert_eq!(config.consumer_group, "mailer");
            assert_eq!(config.block_timeout_ms, 5000);
            assert_eq!(config.app_url, "");
            assert_eq!(config.api_token, None);
            assert_eq!(config.metrics_port, None);
            assert!(!config.mail.send_mails);
            assert_eq!(config.mail.mailersend_api_key, None);
        });
    }

    #[test]
    fn test_missing_required_variable() {
        with_env(&[("ADMIN_EMAIL", None)], || {
            let err = MailerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("ADMIN_EMAIL"));
        });
    }

    #[test]
    fn test_send_mails_must_be_exactly_true() {
        with_env(&[("SEND_MAILS", Some("true"))], || {
            assert!(MailConfig::from_env().unwrap().send_mails);
        });
        with_env(&[("SEND_MAILS", Some("TRUE"))], || {
            assert!(!MailConfig::from_env().unwrap().send_mails);
        });
    }

    #[test]
    fn test_smtp_port_is_not_validated_at_load() {
        with_env(
            &[("SEND_MAILS", Some("true")), ("SMTP_PORT", Some("smtp"))],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.mail.smtp_port, "smtp");
            },
        );
    }

    #[test]
    fn test_stream_config_and_metrics_port() {
        with_env(
            &[
                ("NOTIFICATIONS_STREAM", Some("platform-events")),
                ("NOTIFICATIONS_BLOCK_MS", Some("250")),
                ("METRICS_PORT", Some("9100")),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.metrics_port, Some(9100));

                let stream = config.stream_config();
                assert_eq!(stream.stream_name, "platform-events");
                assert_eq!(stream.consumer_group, "mailer");
                assert_eq!(stream.block_timeout_ms, 250);
            },
        );
    }
}
