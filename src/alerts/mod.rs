//! Alert formatting and dispatch
//!
//! Each long-running query observation becomes one [`Alert`], rendered by the
//! formatter and delivered by the notifier over email and a chat webhook.

use serde::Serialize;

pub mod format;
pub mod notifier;

pub use format::{build_alert, end_time, execution_minutes, format_alert, SUBJECT_PREFIX};
pub use notifier::{DispatchOutcome, Notifier, NotifierError};

/// One formatted notification derived from one long-running query
/// observation. Created and consumed within a single dispatch; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}
