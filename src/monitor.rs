//! One monitoring pass
//!
//! Fetch, format, dispatch, summarize. The run timestamp is captured once and
//! shared by every alert subject. Delivery failures are logged and counted
//! but do not stop the remaining alerts from dispatching; config and fetch
//! errors abort the run.

use serde::Serialize;

use crate::alerts::{build_alert, Notifier, NotifierError, SUBJECT_PREFIX};
use crate::config::{ConfigError, Settings};
use crate::db::{fetch_long_running, DbError, QueryRecord};

/// Errors that abort a run
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Notifier(#[from] NotifierError),
}

/// What one pass did
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Long-running queries observed
    pub records: usize,
    /// Alerts accepted by both channels
    pub delivered: usize,
    pub email_failures: usize,
    pub webhook_failures: usize,
}

impl RunSummary {
    /// True when every observed query was delivered on both channels
    pub fn is_clean(&self) -> bool {
        self.email_failures == 0 && self.webhook_failures == 0
    }
}

/// Execute one monitoring pass.
///
/// Records are processed in database order, longest-running first. Each one
/// gets an email attempt and a webhook attempt regardless of how the other
/// channel fared.
pub async fn run_once(settings: &Settings) -> Result<RunSummary, MonitorError> {
    // Captured once per run, shared by every alert subject
    let run_started = chrono::Local::now();
    let subject = format!(
        "{} {}",
        SUBJECT_PREFIX,
        run_started.format("%Y-%m-%d %H:%M:%S")
    );

    let records = fetch_long_running(&settings.database, &settings.monitor).await?;
    if records.is_empty() {
        tracing::info!("No long-running queries found");
        return Ok(RunSummary::default());
    }

    tracing::info!(count = records.len(), "Long-running queries detected");

    let notifier = Notifier::new(&settings.smtp, settings.webhook_url.clone())?;
    Ok(dispatch_all(&notifier, &records, &subject, &settings.monitor.recipient).await)
}

/// Format and dispatch every record in order, counting outcomes.
///
/// A failed channel is logged and counted; the remaining records still get
/// their full email-plus-webhook attempt.
async fn dispatch_all(
    notifier: &Notifier,
    records: &[QueryRecord],
    subject: &str,
    recipient: &str,
) -> RunSummary {
    let mut summary = RunSummary {
        records: records.len(),
        ..RunSummary::default()
    };

    for record in records {
        let alert = build_alert(record, subject, recipient);
        let outcome = notifier.dispatch(&alert).await;

        if let Err(e) = &outcome.email {
            summary.email_failures += 1;
            tracing::error!(
                user_id = record.user_id,
                pid = record.pid,
                error = %e,
                "Email dispatch failed"
            );
        }
        if let Err(e) = &outcome.webhook {
            summary.webhook_failures += 1;
            tracing::error!(
                user_id = record.user_id,
                pid = record.pid,
                error = %e,
                "Webhook dispatch failed"
            );
        }
        if outcome.fully_delivered() {
            summary.delivered += 1;
            tracing::info!(
                user_id = record.user_id,
                user_name = %record.user_name,
                "Notification sent for long-running query"
            );
        }
    }

    summary
}
