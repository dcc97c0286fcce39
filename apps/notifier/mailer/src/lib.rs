//! Notification Mailer
//!
//! A background service that turns platform events into notification emails.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (events)
//!   ↓ (Consumer Group: mailer)
//! Mailer
//!   ↓ (one event at a time)
//! EventDispatcher → Notifier
//!   ↓ (social + accounting APIs)
//! MailerSend / SMTP / mock transport
//! ```
//!
//! ## Features
//!
//! - Consumer group support, new groups start at the end of the stream
//! - Best-effort delivery: every event is acknowledged once handled, no retries
//! - Emails rendered in each recipient's language
//! - Graceful shutdown on SIGINT/SIGTERM
//! - Optional Prometheus metrics listener (`METRICS_PORT`)

use core_config::{Environment, FromEnv};
use domain_notifications::{
    EventDispatcher, MailSettings, Mailer, MailerConfig, MailerMetrics, Notifier,
    api::HttpApiClient, init_metrics, providers,
};
use event_stream::RedisEventStream;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Run the mailer
///
/// This is the main entry point for the service. It:
/// 1. Sets up structured logging (env-aware: JSON for prod, pretty for dev)
/// 2. Loads configuration and builds the mail transport
/// 3. Connects to Redis and joins the consumer group
/// 4. Handles events until a shutdown signal or a stream failure
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is missing or invalid
/// - The mail transport cannot be built
/// - Redis connection fails
/// - The event stream fails while running
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();

    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Starting notification mailer"
    );
    info!("Environment: {:?}", environment);

    let config = MailerConfig::from_env().wrap_err("Failed to load mailer configuration")?;

    if let Some(port) = config.metrics_port {
        init_metrics(port).wrap_err("Failed to start metrics listener")?;
    }

    let provider =
        providers::from_config(&config.mail).wrap_err("Failed to build mail transport")?;

    let stream_config = config.stream_config();
    info!(
        stream = %stream_config.stream_name,
        consumer_group = %stream_config.consumer_group,
        consumer_id = %stream_config.consumer_id,
        block_timeout_ms = stream_config.block_timeout_ms,
        "Stream configuration loaded"
    );

    info!("Connecting to Redis...");
    let stream = RedisEventStream::connect(stream_config)
        .await
        .wrap_err("Failed to connect to the events stream")?;
    info!("Connected to Redis successfully");

    let api = Arc::new(HttpApiClient::new(
        config.social_url.clone(),
        config.api_token.clone(),
    ));
    let metrics = MailerMetrics::new(config.stream_name.clone());
    let notifier = Notifier::new(
        api,
        provider,
        MailSettings::from_config(&config),
        metrics.clone(),
    )
    .wrap_err("Failed to initialize notifier")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    let mailer = Mailer::new(
        Arc::new(stream),
        Arc::new(EventDispatcher::new(notifier)),
        metrics,
    );
    mailer
        .run(shutdown_rx)
        .await
        .wrap_err("Events stream failed")?;

    info!("Notification mailer stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.wrap_err("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .wrap_err("Failed to install signal handler")?
            .recv()
            .await;
        Ok::<(), eyre::Report>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl+C, initiating shutdown...");
        },
        result = terminate => {
            result?;
            info!("Received SIGTERM, initiating shutdown...");
        },
    }

    Ok(())
}
