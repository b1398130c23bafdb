//! Short code generation and validation utilities.
//!
//! Random codes are drawn from an alphanumeric alphabet; the store's unique
//! constraint is the final arbiter of collisions (the service retries
//! generation when an insert loses that race). A deterministic base-62 mode
//! derives a stable code from a numeric id for callers that want one.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Alphabet for random and deterministic codes.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Minimum length of deterministic codes (shorter encodings are left-padded).
const ENCODED_MIN_LENGTH: usize = 6;

/// Reserved codes that cannot be used as short links.
///
/// These are reserved for system endpoints to prevent routing conflicts.
const RESERVED_CODES: &[&str] = &["api", "health", "stats", "links", "ranking", "admin"];

/// Generates a random alphanumeric short code of the requested length.
///
/// The caller is responsible for the collision protocol: check against the
/// store, insert, and regenerate if the unique constraint rejects the insert.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Derives a stable code from a numeric id (base-62, left-padded to a
/// minimum length).
///
/// Deterministic and collision-free for unique ids; carries no information
/// beyond the id itself.
pub fn encode_id(id: u64) -> String {
    let base = ALPHABET.len() as u64;
    let mut n = id;
    let mut out = Vec::new();

    loop {
        out.push(ALPHABET[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }

    while out.len() < ENCODED_MIN_LENGTH {
        out.push(ALPHABET[0]);
    }

    out.reverse();
    String::from_utf8(out).expect("alphabet is ASCII")
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved system word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < 3 || code.len() > 20 {
        return Err(AppError::bad_request(
            "Custom code must be 3-20 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom code must be alphanumeric",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_requested_length() {
        assert_eq!(generate_code(6).len(), 6);
        assert_eq!(generate_code(10).len(), 10);
    }

    #[test]
    fn test_generate_code_is_alphanumeric() {
        let code = generate_code(20);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_code_produces_distinct_codes() {
        let mut codes = HashSet::new();
        for _ in 0..1000 {
            codes.insert(generate_code(8));
        }
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_encode_id_is_deterministic() {
        assert_eq!(encode_id(12345), encode_id(12345));
    }

    #[test]
    fn test_encode_id_distinct_for_distinct_ids() {
        let mut seen = HashSet::new();
        for id in 0..10_000u64 {
            assert!(seen.insert(encode_id(id)), "collision for id {id}");
        }
    }

    #[test]
    fn test_encode_id_minimum_length() {
        assert_eq!(encode_id(0).len(), 6);
        assert_eq!(encode_id(61).len(), 6);
    }

    #[test]
    fn test_encode_id_grows_past_minimum() {
        // 62^6 is the first id needing 7 digits
        let big = 62u64.pow(6);
        assert_eq!(encode_id(big).len(), 7);
    }

    #[test]
    fn test_validate_accepts_plain_codes() {
        assert!(validate_custom_code("abc").is_ok());
        assert!(validate_custom_code("Promo2025").is_ok());
        assert!(validate_custom_code("a1b2c3d4e5f6g7h8i9j0").is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_custom_code("ab").unwrap_err();
        assert!(err.to_string().contains("3-20"));
    }

    #[test]
    fn test_validate_too_long() {
        assert!(validate_custom_code("a".repeat(21).as_str()).is_err());
    }

    #[test]
    fn test_validate_rejects_non_alphanumeric() {
        assert!(validate_custom_code("my-code").is_err());
        assert!(validate_custom_code("my code").is_err());
        assert!(validate_custom_code("c0de!").is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(
                validate_custom_code(reserved).is_err(),
                "reserved code '{reserved}' should be invalid"
            );
        }
    }
}
