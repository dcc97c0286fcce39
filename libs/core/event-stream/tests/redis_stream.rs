//! Integration tests against a real Redis server.
//!
//! Run with: cargo test -p event-stream -- --ignored

use event_stream::{EventKind, EventStream, RedisEventStream, StreamConfig};
use test_utils::{TestRedis, unique_name};

async fn connect(redis: &TestRedis, stream: &str) -> RedisEventStream {
    let config = StreamConfig::new(redis.connection_string(), stream, "mailer")
        .with_consumer_id("mailer-test")
        .with_block_timeout_ms(100);
    RedisEventStream::connect(config).await.unwrap()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_receive_and_acknowledge() {
    let redis = TestRedis::new().await;
    let stream_name = unique_name("events");
    let stream = connect(&redis, &stream_name).await;

    redis
        .add_entry(
            &stream_name,
            &[
                ("name", "TransferCommitted"),
                ("source", "https://accounting.example.org"),
                ("code", "GRP1"),
                ("time", "2024-05-01T10:00:00Z"),
                ("data", r#"{"payer":"acc-1","payee":"acc-2","transfer":"t-1"}"#),
                ("user", "user-1"),
            ],
        )
        .await;

    let event = stream.receive().await.unwrap();
    assert_eq!(event.kind, EventKind::TransferCommitted);
    assert_eq!(event.code, "GRP1");
    assert_eq!(event.data("transfer"), "t-1");
    assert_eq!(redis.pending_count(&stream_name, "mailer").await, 1);

    stream.acknowledge(&event.id).await.unwrap();
    assert_eq!(redis.pending_count(&stream_name, "mailer").await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_malformed_entry_is_skipped_and_acknowledged() {
    let redis = TestRedis::new().await;
    let stream_name = unique_name("events");
    let stream = connect(&redis, &stream_name).await;

    redis
        .add_entry(&stream_name, &[("name", "GroupActivated"), ("time", "not a time")])
        .await;
    let good_id = redis
        .add_entry(
            &stream_name,
            &[
                ("name", "GroupActivated"),
                ("code", "GRP2"),
                ("time", "2024-05-01T10:00:00Z"),
            ],
        )
        .await;

    let event = stream.receive().await.unwrap();
    assert_eq!(event.id, good_id);
    assert_eq!(event.code, "GRP2");

    // Only the well-formed entry is still pending
    assert_eq!(redis.pending_count(&stream_name, "mailer").await, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_connect_twice_reuses_group() {
    let redis = TestRedis::new().await;
    let stream_name = unique_name("events");

    let first = connect(&redis, &stream_name).await;
    let second = connect(&redis, &stream_name).await;

    assert_eq!(first.consumer_group(), second.consumer_group());
    assert_eq!(second.stream_name(), stream_name);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_kinds_are_delivered() {
    let redis = TestRedis::new().await;
    let stream_name = unique_name("events");
    let stream = connect(&redis, &stream_name).await;

    redis
        .add_entry(
            &stream_name,
            &[("name", "OfferPublished"), ("time", "2024-05-01T10:00:00Z")],
        )
        .await;

    let event = stream.receive().await.unwrap();
    assert_eq!(event.kind, EventKind::Unknown("OfferPublished".to_string()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_idle_stream_with_default_block_window() {
    let redis = TestRedis::new().await;
    let stream_name = unique_name("events");
    let config = StreamConfig::new(redis.connection_string(), &stream_name, "mailer");
    let stream = RedisEventStream::connect(config).await.unwrap();

    let idle = tokio::time::timeout(std::time::Duration::from_secs(7), stream.receive()).await;
    assert!(idle.is_err(), "idle receive returned early");

    redis
        .add_entry(
            &stream_name,
            &[("name", "GroupActivated"), ("code", "GRP1"), ("time", "2024-05-01T10:00:00Z")],
        )
        .await;
    let event = stream.receive().await.unwrap();
    assert_eq!(event.kind, EventKind::GroupActivated);
}
