//! Error types for the Admitad API client.
//!
//! # Design
//! Local failures (`Validation`, `Configuration`) are raised before any I/O
//! happens. Remote failures keep only diagnostic data: `Http` carries the
//! status and the decoded response body, `Connection` and `Json` carry the
//! underlying cause. Nothing is retried; every variant reaches the caller
//! exactly as it was produced.

use serde_json::Value;
use thiserror::Error;

use crate::sanitize::ValidationError;

/// Cause of a transport-level failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the client, the request builder and the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A caller-supplied argument violated a field constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be assembled (no URL, unsupported method,
    /// broken URL template, unreadable configuration).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server answered with an error status. `content` is the decoded
    /// JSON body, or the raw text when the body is not JSON.
    #[error("HTTP {status}: {message}\n{content}")]
    Http {
        status: u16,
        message: String,
        content: Value,
    },

    /// No response was obtained (DNS, refused connection, timeout, TLS).
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// A success response whose body is not valid JSON.
    #[error("invalid JSON response: {0}")]
    Json(#[source] serde_json::Error),

    /// The server answered successfully but the content is unusable.
    #[error("unexpected API response: {0}")]
    Api(Value),
}

impl ApiError {
    /// Status code of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body attached to an `Http` or `Api` error.
    pub fn content(&self) -> Option<&Value> {
        match self {
            ApiError::Http { content, .. } | ApiError::Api(content) => Some(content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn http_error_exposes_status_and_content() {
        let err = ApiError::Http {
            status: 400,
            message: "400 Bad Request for url: https://api.admitad.com/".to_string(),
            content: json!({"error_code": "no_coupon"}),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.content(), Some(&json!({"error_code": "no_coupon"})));
        assert!(err.to_string().starts_with("HTTP 400: 400 Bad Request"));
    }

    #[test]
    fn validation_error_converts_transparently() {
        let err: ApiError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "name: value is required");
        assert_eq!(err.status(), None);
    }
}
