//! Error types for horizon.

use thiserror::Error;

/// Result type alias using horizon's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for horizon operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found (or not visible to the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied data violates a stated constraint
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No authenticated identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but role is insufficient
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing or invalid configuration (e.g. provider credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider rejected the request due to rate limiting
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider quota or credits exhausted
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Provider returned a payload that could not be interpreted
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// No usable content could be extracted or analyzed
    #[error("No content: {0}")]
    NoContent(String),

    /// Analysis input below the minimum length
    #[error("Content too short: {0} characters (minimum 100)")]
    ContentTooShort(usize),

    /// Scrape provider request failed
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// LLM analysis request failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("workspace".to_string());
        assert_eq!(err.to_string(), "Not found: workspace");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("title exceeds 180 characters".to_string());
        assert_eq!(err.to_string(), "Invalid input: title exceeds 180 characters");
    }

    #[test]
    fn test_error_display_content_too_short() {
        let err = Error::ContentTooShort(42);
        assert_eq!(
            err.to_string(),
            "Content too short: 42 characters (minimum 100)"
        );
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited("try again in 60s".to_string());
        assert_eq!(err.to_string(), "Rate limited: try again in 60s");
    }

    #[test]
    fn test_error_display_quota_exhausted() {
        let err = Error::QuotaExhausted("billing period".to_string());
        assert_eq!(err.to_string(), "Quota exhausted: billing period");
    }

    #[test]
    fn test_error_display_malformed_response() {
        let err = Error::MalformedResponse("expected object".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed provider response: expected object"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("FIRECRAWL_API_KEY is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: FIRECRAWL_API_KEY is not set"
        );
    }

    #[test]
    fn test_error_display_no_content() {
        let err = Error::NoContent("nothing extracted".to_string());
        assert_eq!(err.to_string(), "No content: nothing extracted");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("viewer role is read-only".to_string());
        assert_eq!(err.to_string(), "Forbidden: viewer role is read-only");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
