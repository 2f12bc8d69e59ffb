//! Alert formatting
//!
//! Pure functions: a [`QueryRecord`] in, a deterministic text block out. The
//! database reports duration in milliseconds; end time is start plus that
//! duration, and execution time is rendered in minutes to two decimals.

use chrono::NaiveDateTime;

use super::Alert;
use crate::db::QueryRecord;

/// Fixed subject line prefix; the run timestamp is appended once per run
pub const SUBJECT_PREFIX: &str = "Long-Running Query Alert";

/// When the query would finish if it stopped now: start + reported duration
pub fn end_time(start: NaiveDateTime, duration_ms: i64) -> NaiveDateTime {
    start + chrono::Duration::milliseconds(duration_ms)
}

/// Reported duration converted to minutes
pub fn execution_minutes(duration_ms: i64) -> f64 {
    duration_ms as f64 / 60_000.0
}

/// Render one record into the alert body.
///
/// Embeds all seven observed fields: user id, user name, start time, computed
/// end time, raw query text, execution minutes, database name.
pub fn format_alert(record: &QueryRecord) -> String {
    format!(
        "Long-Running Query Alert:\n\
         - User ID: {}\n\
         - Username: {}\n\
         - Start Time: {}\n\
         - End Time: {}\n\
         - Query: {}\n\
         - Execution Time: {:.2} minutes\n\
         - Database: {}\n",
        record.user_id,
        record.user_name,
        record.start_time,
        end_time(record.start_time, record.duration_ms),
        record.query,
        execution_minutes(record.duration_ms),
        record.db_name,
    )
}

/// Pair a record's body with the once-per-run subject and the configured
/// recipient
pub fn build_alert(record: &QueryRecord, subject: &str, recipient: &str) -> Alert {
    Alert {
        subject: subject.to_string(),
        body: format_alert(record),
        recipient: recipient.to_string(),
    }
}
