//! Click event model for asynchronous click tracking.

/// An in-memory click event passed from the redirect handler to the
/// ingestion worker via a bounded channel.
///
/// The handler enqueues with `try_send` and returns immediately; the
/// redirect response never waits on ingestion. The session fingerprint is
/// computed at enqueue time so the worker stays a pure consumer of request
/// data.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    /// Short code, carried for logging only.
    pub code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub fingerprint: String,
}

impl ClickEvent {
    pub fn new(
        link_id: i64,
        code: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        let fingerprint =
            crate::utils::fingerprint::session_fingerprint(ip.as_deref(), user_agent);

        Self {
            link_id,
            code,
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
            fingerprint,
        }
    }
}
