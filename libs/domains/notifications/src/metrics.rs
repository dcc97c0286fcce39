//! Prometheus metrics for the mailer
//!
//! Counters are always recorded; they are only exported when a Prometheus
//! listener was installed with `init_metrics`.

use crate::error::{NotificationError, NotificationResult};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

static METRICS_INSTALLED: OnceCell<SocketAddr> = OnceCell::new();

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Must run inside a tokio runtime. Subsequent calls are no-ops.
pub fn init_metrics(port: u16) -> NotificationResult<()> {
    if METRICS_INSTALLED.get().is_some() {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            NotificationError::ConfigError(format!("Failed to install Prometheus exporter: {}", e))
        })?;

    let _ = METRICS_INSTALLED.set(addr);
    info!(%addr, "Prometheus metrics listening");
    Ok(())
}

/// Mailer metrics helper
#[derive(Clone)]
pub struct MailerMetrics {
    /// Stream name for labeling
    stream_name: String,
}

impl MailerMetrics {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
        }
    }

    /// Record an event being received
    pub fn event_received(&self, kind: &str) {
        counter!(
            "mailer_events_received_total",
            "stream" => self.stream_name.clone(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    /// Record an event handled without error
    pub fn event_handled(&self, kind: &str, duration: Duration) {
        counter!(
            "mailer_events_handled_total",
            "stream" => self.stream_name.clone(),
            "kind" => kind.to_string(),
            "status" => "success"
        )
        .increment(1);

        histogram!(
            "mailer_event_duration_seconds",
            "stream" => self.stream_name.clone(),
            "kind" => kind.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Record an event whose handler failed
    pub fn event_failed(&self, kind: &str) {
        counter!(
            "mailer_events_handled_total",
            "stream" => self.stream_name.clone(),
            "kind" => kind.to_string(),
            "status" => "failed"
        )
        .increment(1);
    }

    /// Record an acknowledgment that could not be written
    pub fn ack_failed(&self) {
        counter!(
            "mailer_ack_errors_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }

    pub fn email_sent(&self, provider: &'static str) {
        counter!(
            "mailer_emails_total",
            "provider" => provider,
            "status" => "sent"
        )
        .increment(1);
    }

    pub fn email_failed(&self, provider: &'static str) {
        counter!(
            "mailer_emails_total",
            "provider" => provider,
            "status" => "failed"
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = MailerMetrics::new("events");
        metrics.event_received("TransferCommitted");
        metrics.event_handled("TransferCommitted", Duration::from_millis(5));
        metrics.event_failed("MemberJoined");
        metrics.ack_failed();
        metrics.email_sent("mock");
        metrics.email_failed("smtp");
    }
}
