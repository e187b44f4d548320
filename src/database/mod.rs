pub mod accounts;
pub mod manager;
pub mod models;
pub mod reservations;

use chrono::{SecondsFormat, Utc};

/// RFC3339 UTC timestamp with millisecond precision, the storage format for
/// `created_at`/`createdAt`. Lexicographic order equals chronological order.
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
