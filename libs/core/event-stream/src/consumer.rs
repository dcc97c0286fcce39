//! Stream consumer for Redis operations
//!
//! Reads events from a Redis stream through a consumer group, one entry per
//! read, and acknowledges them on request.

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::event::Event;
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, RedisResult};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of platform events.
///
/// `receive` blocks until an event is available; an error means the
/// transport itself failed. Every received event must be passed to
/// `acknowledge` once its handling is over.
#[async_trait]
pub trait EventStream: Send + Sync {
    /// Block until the next event is delivered.
    async fn receive(&self) -> Result<Event, StreamError>;

    /// Mark an event as processed.
    async fn acknowledge(&self, event_id: &str) -> Result<(), StreamError>;
}

type StreamReply = Vec<(String, Vec<(String, Vec<(String, String)>)>)>;

/// Slack on top of the XREADGROUP block window before a reply counts as lost.
const RESPONSE_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Response timeout for every command on the consumer connection.
///
/// A blocking read legitimately stays silent for the whole block window, so
/// the timeout has to outlast it.
fn response_timeout(block_timeout_ms: u64) -> Duration {
    Duration::from_millis(block_timeout_ms) + RESPONSE_TIMEOUT_MARGIN
}

/// Redis Streams implementation of `EventStream`
pub struct RedisEventStream {
    redis: ConnectionManager,
    config: StreamConfig,
}

impl RedisEventStream {
    /// Create a consumer on top of an existing connection.
    ///
    /// The connection's response timeout must be longer than the block window,
    /// or idle reads fail; `connect` sets it up that way.
    pub fn new(redis: ConnectionManager, config: StreamConfig) -> Self {
        Self { redis, config }
    }

    /// Connect to Redis and make sure the consumer group exists.
    pub async fn connect(config: StreamConfig) -> Result<Self, StreamError> {
        info!(stream = %config.stream_name, "Connecting to events stream");

        let client = Client::open(config.redis_url.as_str())?;
        let manager_config = ConnectionManagerConfig::new()
            .set_response_timeout(Some(response_timeout(config.block_timeout_ms)));
        let manager = ConnectionManager::new_with_config(client, manager_config).await?;

        // Verify connection with PING
        let mut conn = manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        let stream = Self::new(manager, config);
        stream.ensure_consumer_group().await?;
        Ok(stream)
    }

    /// Get the stream name
    pub fn stream_name(&self) -> &str {
        &self.config.stream_name
    }

    /// Get the consumer group
    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    /// Get the consumer ID
    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    /// Create the consumer group if it doesn't exist.
    ///
    /// New groups start at the end of the stream: events published while no
    /// group existed are not replayed.
    pub async fn ensure_consumer_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
                Ok(())
            }
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    /// Read at most one new entry, waiting up to the configured block window.
    async fn read_next(&self) -> Result<Option<(String, HashMap<String, String>)>, StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<Option<StreamReply>> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(1)
            .arg("BLOCK")
            .arg(self.config.block_timeout_ms)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">")
            .query_async(&mut conn)
            .await;

        let streams = match result.map_err(StreamError::Redis) {
            Ok(Some(streams)) => streams,
            // Block window elapsed without new entries
            Ok(None) => return Ok(None),
            Err(e) if e.is_nogroup_error() => {
                warn!(
                    stream = %self.config.stream_name,
                    "Consumer group missing, recreating"
                );
                self.ensure_consumer_group().await?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(streams
            .into_iter()
            .flat_map(|(_stream, entries)| entries)
            .next()
            .map(|(id, fields)| (id, fields.into_iter().collect())))
    }
}

#[async_trait]
impl EventStream for RedisEventStream {
    async fn receive(&self) -> Result<Event, StreamError> {
        loop {
            let Some((id, fields)) = self.read_next().await? else {
                continue;
            };

            match Event::from_entry(&id, &fields) {
                Ok(event) => {
                    debug!(event_id = %event.id, kind = %event.kind, "Received event");
                    return Ok(event);
                }
                Err(e) => {
                    // Never handed to handlers; ack so it does not stay pending forever.
                    warn!(stream_id = %id, error = %e, "Skipping malformed event");
                    self.acknowledge(&id).await?;
                }
            }
        }
    }

    async fn acknowledge(&self, event_id: &str) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(event_id)
            .query_async(&mut conn)
            .await?;

        debug!(event_id = %event_id, "Acknowledged event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_timeout_outlasts_block_window() {
        assert_eq!(response_timeout(5000), Duration::from_secs(10));
        assert!(response_timeout(0) > Duration::ZERO);
        assert!(response_timeout(60_000) > Duration::from_millis(60_000));
    }
}
