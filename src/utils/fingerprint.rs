//! Session fingerprint derivation for unique-visitor counting.

use sha2::{Digest, Sha256};

/// Derives the session fingerprint from client IP and user-agent string.
///
/// The fingerprint is an opaque uniqueness key, not a security credential.
/// Missing components degrade to empty strings so that the hash is always
/// defined.
pub fn session_fingerprint(ip: Option<&str>, user_agent: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.unwrap_or_default().as_bytes());
    hasher.update(b"_");
    hasher.update(user_agent.unwrap_or_default().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = session_fingerprint(Some("192.168.1.1"), Some("Mozilla/5.0"));
        let b = session_fingerprint(Some("192.168.1.1"), Some("Mozilla/5.0"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_by_ip() {
        let a = session_fingerprint(Some("192.168.1.1"), Some("Mozilla/5.0"));
        let b = session_fingerprint(Some("192.168.1.2"), Some("Mozilla/5.0"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_by_user_agent() {
        let a = session_fingerprint(Some("10.0.0.1"), Some("Chrome/120"));
        let b = session_fingerprint(Some("10.0.0.1"), Some("Safari/17"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_handles_missing_components() {
        let fp = session_fingerprint(None, None);
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
