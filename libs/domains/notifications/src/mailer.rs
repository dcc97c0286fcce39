//! The mailer event loop.
//!
//! Events are handled one at a time, in delivery order. Handler failures are
//! logged and the event is acknowledged anyway: delivery is best-effort and
//! nothing is retried. Only a failing stream ends the loop.

use crate::dispatcher::EventHandler;
use crate::metrics::MailerMetrics;
use event_stream::{Event, EventStream, StreamError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span};

pub struct Mailer {
    stream: Arc<dyn EventStream>,
    handler: Arc<dyn EventHandler>,
    metrics: MailerMetrics,
}

impl Mailer {
    pub fn new(
        stream: Arc<dyn EventStream>,
        handler: Arc<dyn EventHandler>,
        metrics: MailerMetrics,
    ) -> Self {
        Self {
            stream,
            handler,
            metrics,
        }
    }

    /// Run until shutdown is signalled or the stream fails.
    ///
    /// A receive error is returned to the caller; the process is expected to
    /// exit and be restarted.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(handler = self.handler.name(), "Starting mailer");

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping mailer");
                break;
            }

            let received = tokio::select! {
                _ = shutdown.changed() => {
                    info!("Received shutdown signal, stopping mailer");
                    break;
                }
                received = self.stream.receive() => received,
            };

            let event = match received {
                Ok(event) => event,
                Err(e) => {
                    error!(error = %e, "Failed to receive event");
                    return Err(e);
                }
            };

            let span = info_span!(
                "event",
                event_id = %event.id,
                kind = %event.kind,
                tenant = %event.code
            );
            self.process(&event).instrument(span).await;
        }

        info!("Mailer stopped");
        Ok(())
    }

    async fn process(&self, event: &Event) {
        let kind = event.kind.name();
        self.metrics.event_received(kind);

        let start = Instant::now();
        match self.handler.handle(event).await {
            Ok(()) => {
                debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Event handled");
                self.metrics.event_handled(kind, start.elapsed());
            }
            Err(e) => {
                error!(error = %e, "Error handling event");
                self.metrics.event_failed(kind);
            }
        }

        if let Err(e) = self.stream.acknowledge(&event.id).await {
            error!(error = %e, "Failed to acknowledge event");
            self.metrics.ack_failed();
        }
    }
}
