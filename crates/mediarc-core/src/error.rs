//! Error types module
//!
//! This module provides the core error types used throughout the Mediarc
//! application. All errors are unified under the `AppError` enum which can
//! represent storage, media-processing, and metadata-validation errors.

use std::io;

use serde::Serialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PAYLOAD_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// A single structural problem found while validating metadata against its
/// registered schema. `path` is a JSONPath-like locator (`$.title1.pretty`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolationDetail {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolationDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Metadata does not match the '{kind}' schema ({} violation(s))", .violations.len())]
    SchemaViolation {
        kind: String,
        violations: Vec<SchemaViolationDetail>,
    },

    #[error("Media decode error: {0}")]
    MediaDecode(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations following Rust best practices
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedJson(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedJson(_) => (
            400,
            "MALFORMED_JSON",
            false,
            Some("Check that the metadata payload is valid JSON"),
            false,
            LogLevel::Debug,
        ),
        AppError::SchemaViolation { .. } => (
            422,
            "SCHEMA_VIOLATION",
            false,
            Some("Fix the listed fields and resubmit"),
            false,
            LogLevel::Debug,
        ),
        AppError::MediaDecode(_) => (
            500,
            "MEDIA_DECODE_ERROR",
            false,
            Some("The declared content type does not match the file contents"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::MalformedJson(_) => "MalformedJson",
            AppError::SchemaViolation { .. } => "SchemaViolation",
            AppError::MediaDecode(_) => "MediaDecode",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::MalformedJson(ref msg) => format!("Malformed JSON: {}", msg),
            AppError::SchemaViolation { kind, violations } => {
                let listed: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                format!(
                    "Metadata does not match the '{}' schema: {}",
                    kind,
                    listed.join("; ")
                )
            }
            AppError::MediaDecode(_) => "Failed to decode media data".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge(
            "File exceeds maximum allowed size of 52428800 bytes".to_string(),
        );
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("52428800"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_schema_violation() {
        let err = AppError::SchemaViolation {
            kind: "reddit".to_string(),
            violations: vec![SchemaViolationDetail {
                path: "$.score".to_string(),
                message: "required field is missing".to_string(),
            }],
        };
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_code(), "SCHEMA_VIOLATION");
        assert!(err.client_message().contains("$.score"));
        assert!(err.client_message().contains("reddit"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_media_decode() {
        let err = AppError::MediaDecode("gif decode failed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "MEDIA_DECODE_ERROR");
        assert_eq!(err.client_message(), "Failed to decode media data");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_malformed_json_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = AppError::from(parse_err);
        assert_eq!(err.error_code(), "MALFORMED_JSON");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("root cause").context("intermediate");
        let err = AppError::InternalWithSource {
            message: "outer".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
        assert!(details.contains("root cause"));
    }

    #[test]
    fn test_violation_detail_display() {
        let detail = SchemaViolationDetail {
            path: "$.tags[2]".to_string(),
            message: "expected string".to_string(),
        };
        assert_eq!(detail.to_string(), "$.tags[2]: expected string");
    }
}
