//! Click entity representing a single recorded redirect.

use chrono::{DateTime, Utc};

/// A click recorded when a shortened link is accessed.
///
/// Immutable once written. Always references an existing link; rows are
/// removed only by the retention sweep or a cascading link purge.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    /// Opaque hash of client IP + user agent, used for unique-visitor
    /// counting. Not a security credential.
    pub fingerprint: String,
    pub clicked_at: DateTime<Utc>,
}

/// Input data for recording a new click.
///
/// Produced by the ingestion worker after user-agent classification.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub fingerprint: String,
}
