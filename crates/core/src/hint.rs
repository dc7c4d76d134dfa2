//! Error hint classifier
//!
//! Maps an error message to a short remediation hint by case-insensitive
//! substring matching. The keyword groups are checked in order and the first
//! match wins, because service messages often contain several keywords.
//! This is advisory only: callers print the hint and never branch on it.

use std::fmt;

/// Ordered keyword groups; earlier groups take priority
const KEYWORD_GROUPS: &[(&[&str], Hint)] = &[
    (&["unauthorized", "jwt", "token"], Hint::Auth),
    (&["not found", "does not exist"], Hint::MissingResource),
    (&["timeout"], Hint::Network),
    (&["limit"], Hint::Quota),
    (&["already exists"], Hint::AlreadyExists),
];

/// A human-readable remediation hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// Key is invalid, expired, or lacks permission
    Auth,
    /// Bucket or object is missing
    MissingResource,
    /// Network trouble or slow endpoint
    Network,
    /// Size or rate quota was hit
    Quota,
    /// Object exists and overwrite was not requested
    AlreadyExists,
    /// Nothing matched; echoes the raw message
    Generic(String),
}

impl Hint {
    /// Classify an error message
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        KEYWORD_GROUPS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, hint)| hint.clone())
            .unwrap_or_else(|| Hint::Generic(message.to_string()))
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Auth => f.write_str(
                "Authentication issue: check that the API key is correct and not expired. \
                 The service role key bypasses row-level security; the anon key is subject to bucket policies.",
            ),
            Hint::MissingResource => f.write_str(
                "Resource not found: verify the bucket name and object path. Names are case-sensitive.",
            ),
            Hint::Network => f.write_str(
                "Network issue: the request timed out. Check your connection and that the project URL is reachable.",
            ),
            Hint::Quota => f.write_str(
                "Limit reached: check the bucket's file size limit and your plan quotas.",
            ),
            Hint::AlreadyExists => f.write_str(
                "Object already exists: enable upsert to overwrite it or choose a different path.",
            ),
            Hint::Generic(message) => write!(f, "Unexpected error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_any_case() {
        assert_eq!(Hint::classify("Unauthorized"), Hint::Auth);
        assert_eq!(Hint::classify("request UNAUTHORIZED by gateway"), Hint::Auth);
        assert_eq!(Hint::classify("invalid JWT: signature mismatch"), Hint::Auth);
        assert_eq!(Hint::classify("Token expired"), Hint::Auth);
    }

    #[test]
    fn test_classify_auth_wins_over_later_groups() {
        assert_eq!(
            Hint::classify("unauthorized: bucket not found or timeout"),
            Hint::Auth
        );
    }

    #[test]
    fn test_classify_missing_resource() {
        assert_eq!(Hint::classify("Object not found"), Hint::MissingResource);
        assert_eq!(
            Hint::classify("The bucket does not exist"),
            Hint::MissingResource
        );
        assert_eq!(
            Hint::classify("not found after timeout"),
            Hint::MissingResource
        );
    }

    #[test]
    fn test_classify_network_quota_exists() {
        assert_eq!(Hint::classify("Gateway Timeout"), Hint::Network);
        assert_eq!(
            Hint::classify("Payload exceeds the size limit"),
            Hint::Quota
        );
        assert_eq!(
            Hint::classify("The resource already exists"),
            Hint::AlreadyExists
        );
    }

    #[test]
    fn test_classify_generic_echoes_message() {
        let hint = Hint::classify("something odd happened");
        assert_eq!(hint, Hint::Generic("something odd happened".into()));
        assert_eq!(hint.to_string(), "Unexpected error: something odd happened");
    }

    #[test]
    fn test_classify_empty_message() {
        assert_eq!(Hint::classify(""), Hint::Generic(String::new()));
    }
}
