//! Notification Mailer - Entry Point
//!
//! Sends notification emails for the platform events read from Redis.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    notifier_mailer::run().await
}
