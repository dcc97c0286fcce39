//! Event Stream
//!
//! Consumes the platform's domain events from a Redis stream through a
//! consumer group, one entry at a time.
//!
//! ## Features
//!
//! - **Typed events**: `Event` with a closed `EventKind` (unknown names are kept, not rejected)
//! - **Consumer groups**: the group is created on connect (`MKSTREAM`), `BUSYGROUP` is ignored
//! - **Blocking receive**: `receive()` only returns with an event or a transport error
//! - **Explicit acknowledgment**: callers decide when an entry is done via `acknowledge()`
//!
//! ## Example
//!
//! ```ignore
//! use event_stream::{EventStream, RedisEventStream, StreamConfig};
//!
//! let config = StreamConfig::new("redis://127.0.0.1:6379", "events", "mailer");
//! let stream = RedisEventStream::connect(config).await?;
//!
//! loop {
//!     let event = stream.receive().await?;
//!     // handle the event ...
//!     stream.acknowledge(&event.id).await?;
//! }
//! ```

mod config;
mod consumer;
mod error;
mod event;

pub use config::StreamConfig;
pub use consumer::{EventStream, RedisEventStream};
pub use error::StreamError;
pub use event::{Event, EventKind};
