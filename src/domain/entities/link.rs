//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its analytics counters.
///
/// `code` is globally unique and immutable after creation. The counters and
/// `last_accessed` are mutated only by the click ingestion pipeline, always
/// as relative deltas applied in the store.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub unique_clicks: i64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    ///
    /// Expiry is computed, never stored: a link can become expired without
    /// any write having happened.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Expiry evaluated against an explicit instant (for cached snapshots).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
/// The short code itself is immutable and cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub target_url: Option<String>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_link(expires_at: Option<DateTime<Utc>>) -> Link {
        let now = Utc::now();
        Link {
            id: 1,
            code: "abc123".to_string(),
            target_url: "https://example.com".to_string(),
            title: None,
            description: None,
            is_active: true,
            expires_at,
            clicks: 0,
            unique_clicks: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let link = test_link(None);
        assert!(!link.is_expired());
    }

    #[test]
    fn test_link_with_past_expiry_is_expired() {
        let link = test_link(Some(Utc::now() - Duration::seconds(1)));
        assert!(link.is_expired());
    }

    #[test]
    fn test_link_with_future_expiry_is_not_expired() {
        let link = test_link(Some(Utc::now() + Duration::days(1)));
        assert!(!link.is_expired());
    }

    #[test]
    fn test_is_expired_at_evaluates_against_given_instant() {
        let expiry = Utc::now() + Duration::hours(1);
        let link = test_link(Some(expiry));

        assert!(!link.is_expired_at(expiry - Duration::seconds(1)));
        assert!(link.is_expired_at(expiry + Duration::seconds(1)));
    }
}
