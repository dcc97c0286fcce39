//! Routing of events to their notification handler.

use crate::api::RequestContext;
use crate::error::NotificationResult;
use crate::handlers::Notifier;
use async_trait::async_trait;
use event_stream::{Event, EventKind};
use tracing::debug;

/// Trait for event handlers driven by the mailer loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a single event. Errors are reported, never retried.
    async fn handle(&self, event: &Event) -> NotificationResult<()>;

    /// Get the handler name for logging.
    fn name(&self) -> &'static str;
}

/// Selects the `Notifier` operation for each event kind.
pub struct EventDispatcher {
    notifier: Notifier,
}

impl EventDispatcher {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn handle(&self, event: &Event) -> NotificationResult<()> {
        if !event.kind.is_known() {
            debug!(kind = %event.kind, "No notification for event kind");
            return Ok(());
        }

        let ctx = RequestContext::from_event(event)?;
        let n = &self.notifier;

        match &event.kind {
            EventKind::TransferCommitted => n.transfer_committed(&ctx, event).await,
            EventKind::TransferRejected => n.transfer_rejected(&ctx, event).await,
            EventKind::TransferPending => n.transfer_pending(&ctx, event).await,
            EventKind::MemberRequested => n.member_requested(&ctx, event).await,
            EventKind::MemberJoined => n.member_joined(&ctx, event).await,
            EventKind::GroupActivated => n.group_activated(&ctx, event).await,
            EventKind::GroupRequested => n.group_requested(&ctx, event).await,
            EventKind::Unknown(_) => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "EventDispatcher"
    }
}
