use std::path::PathBuf;

use serde::Deserialize;

use crate::task::TaskKind;

/// Errors returned by the bedrock-tasks crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required input was absent and no documented default applies.
    #[error("task {task} requires input `{key}`")]
    MissingInput { task: TaskKind, key: &'static str },

    /// A referenced local file (e.g. an image path) does not exist.
    #[error("resource not found: {}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inference service rejected the invocation (transport succeeded,
    /// service answered with an error status).
    #[error("invocation failed (status {status}): {body}")]
    Invocation { status: u16, body: ServiceErrorBody },

    /// Malformed base64 where structured extraction was attempted.
    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("request signing error: {0}")]
    Signing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error detail returned in the body of service error responses.
///
/// Bedrock error bodies carry a `message` field and sometimes a `__type`
/// discriminator.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub message: String,
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
}

impl std::fmt::Display for ServiceErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(t) => write!(f, "{}: {}", t, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl ServiceErrorBody {
    /// Parse a raw error body, falling back to the body text when it is
    /// not the expected JSON shape.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|_| ServiceErrorBody {
            message: String::from_utf8_lossy(bytes).to_string(),
            error_type: None,
        })
    }
}

impl Error {
    /// Returns `true` if this error is transient per the HTTP status code
    /// (408, 429, 5xx) or a transport timeout/connect failure.
    ///
    /// The crate itself never retries; this classification is for callers
    /// that layer their own retry policy on top.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Invocation { status, .. } => is_retryable_status(*status),
            Error::Http(e) => {
                if e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    is_retryable_status(status.as_u16())
                } else {
                    e.is_connect()
                }
            }
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429) || status >= 500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_body_display() {
        let body = ServiceErrorBody {
            message: "model identifier is invalid".to_string(),
            error_type: Some("ValidationException".to_string()),
        };
        assert_eq!(
            body.to_string(),
            "ValidationException: model identifier is invalid"
        );

        let body = ServiceErrorBody {
            message: "too many requests".to_string(),
            error_type: None,
        };
        assert_eq!(body.to_string(), "too many requests");
    }

    #[test]
    fn test_service_error_body_from_json() {
        let body = ServiceErrorBody::from_bytes(br#"{"message": "throttled"}"#);
        assert_eq!(body.message, "throttled");
        assert!(body.error_type.is_none());

        let body = ServiceErrorBody::from_bytes(
            br#"{"__type": "ThrottlingException", "message": "slow down"}"#,
        );
        assert_eq!(body.error_type.as_deref(), Some("ThrottlingException"));
    }

    #[test]
    fn test_service_error_body_from_non_json() {
        let body = ServiceErrorBody::from_bytes(b"<html>bad gateway</html>");
        assert_eq!(body.message, "<html>bad gateway</html>");
        assert!(body.error_type.is_none());
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(408));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(403));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn test_invocation_error_retryable() {
        let err = Error::Invocation {
            status: 429,
            body: ServiceErrorBody {
                message: "throttled".to_string(),
                error_type: Some("ThrottlingException".to_string()),
            },
        };
        assert!(err.is_retryable());

        let err = Error::Invocation {
            status: 400,
            body: ServiceErrorBody {
                message: "bad payload".to_string(),
                error_type: None,
            },
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_input_not_retryable() {
        let err = Error::MissingInput {
            task: TaskKind::Sentiment,
            key: "text",
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "task sentiment requires input `text`");
    }
}
