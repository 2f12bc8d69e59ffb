//! Querywatch binary
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - QUERYWATCH_EMAIL_CONFIG: Notification config path (default: /config/email_config.ini)
//! - QUERYWATCH_DB_CONFIG: Database config path (default: /config/db_config.ini)
//! - RUST_LOG: Log level (default: info)
//!
//! Intended to be invoked periodically by an external scheduler such as cron.
//! Exits non-zero when the run fails or any alert could not be delivered.

use querywatch::config::Settings;
use querywatch::monitor::run_once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querywatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let email_path = std::env::var("QUERYWATCH_EMAIL_CONFIG")
        .unwrap_or_else(|_| "/config/email_config.ini".to_string());
    let db_path = std::env::var("QUERYWATCH_DB_CONFIG")
        .unwrap_or_else(|_| "/config/db_config.ini".to_string());

    tracing::info!(
        email_config = %email_path,
        db_config = %db_path,
        "Starting long-running query check"
    );

    let settings = match Settings::load(&email_path, &db_path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    match run_once(&settings).await {
        Ok(summary) if summary.is_clean() => {
            tracing::info!(
                records = summary.records,
                delivered = summary.delivered,
                "Run complete"
            );
        }
        Ok(summary) => {
            tracing::error!(
                records = summary.records,
                delivered = summary.delivered,
                email_failures = summary.email_failures,
                webhook_failures = summary.webhook_failures,
                "Run completed with delivery failures"
            );
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            std::process::exit(1);
        }
    }
}
