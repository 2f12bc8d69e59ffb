//! Querywatch: Long-Running Query Monitor
//!
//! Watches a Postgres-compatible analytical database for queries that have
//! been running longer than a threshold inside a trailing window, and sends
//! one email plus one chat-webhook message per offending query.
//!
//! The pipeline is a single pass with four stages and no feedback loops:
//! config loading, query fetching, alert formatting, and notification
//! dispatch. Scheduling is external (run it from cron); nothing survives a
//! run.
//!
//! # Example
//!
//! ```no_run
//! use querywatch::config::Settings;
//! use querywatch::monitor::run_once;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load("/config/email_config.ini", "/config/db_config.ini")?;
//! let summary = run_once(&settings).await?;
//! println!("{} queries alerted", summary.records);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod db;
pub mod monitor;

// Re-export commonly used types
pub use alerts::{Alert, Notifier, NotifierError};
pub use config::{ConfigError, Settings};
pub use db::{DbError, QueryRecord};
pub use monitor::{run_once, MonitorError, RunSummary};
