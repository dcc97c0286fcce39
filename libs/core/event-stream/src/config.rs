//! Stream consumer configuration

use uuid::Uuid;

/// Configuration for the event stream consumer
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// Redis stream key
    pub stream_name: String,

    /// Consumer group name
    pub consumer_group: String,

    /// Unique consumer ID (auto-generated if not provided)
    pub consumer_id: String,

    /// How long a single XREADGROUP blocks before it is re-issued
    pub block_timeout_ms: u64,
}

impl StreamConfig {
    /// Create a new StreamConfig with default consumer ID and block window
    pub fn new(
        redis_url: impl Into<String>,
        stream_name: impl Into<String>,
        consumer_group: impl Into<String>,
    ) -> Self {
        Self {
            redis_url: redis_url.into(),
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("consumer-{}", Uuid::new_v4()),
            block_timeout_ms: 5000,
        }
    }

    /// Set the consumer ID
    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    /// Set the blocking window of a single read
    pub fn with_block_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.block_timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = StreamConfig::new("redis://localhost:6379", "events", "mailer");
        assert_eq!(config.stream_name, "events");
        assert_eq!(config.consumer_group, "mailer");
        assert!(config.consumer_id.starts_with("consumer-"));
        assert_eq!(config.block_timeout_ms, 5000);
    }

    #[test]
    fn test_config_builders() {
        let config = StreamConfig::new("redis://localhost:6379", "events", "mailer")
            .with_consumer_id("mailer-1")
            .with_block_timeout_ms(250);
        assert_eq!(config.consumer_id, "mailer-1");
        assert_eq!(config.block_timeout_ms, 250);
    }

    #[test]
    fn test_consumer_ids_are_unique() {
        let a = StreamConfig::new("redis://localhost", "events", "mailer");
        let b = StreamConfig::new("redis://localhost", "events", "mailer");
        assert_ne!(a.consumer_id, b.consumer_id);
    }
}
