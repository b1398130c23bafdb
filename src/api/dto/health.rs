//! Health check response body.

use serde::Serialize;

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
    /// Free slots remaining in the click queue.
    pub click_queue_free: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
