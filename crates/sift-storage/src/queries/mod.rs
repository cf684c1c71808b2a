//! Query modules, one per table family.

pub mod label_ops;
pub mod message_ops;
pub mod proposal_ops;
pub mod version_ops;

use chrono::{DateTime, Utc};

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption.
pub(crate) fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
