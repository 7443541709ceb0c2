//! Network-related error types.
//!
//! These cover everything between the client and the first byte of a healthy
//! response body: connections, timeouts, and HTTP status failures.

use std::fmt;

/// Network-specific error variants.
#[derive(Debug, Clone)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request or read timed out.
    Timeout { operation: String },

    /// HTTP status error (non-2xx response). A stream request answered this
    /// way is a protocol violation: the session fails without a retry.
    HttpStatus { status: u16, message: String },

    /// The response body could not be read.
    Io { message: String },

    /// Request was cancelled by a superseding send.
    Cancelled,

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Whether this failure suggests connectivity was lost (as opposed to the
    /// server rejecting a well-delivered request).
    pub fn is_connectivity_loss(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed { .. }
                | NetworkError::Timeout { .. }
                | NetworkError::Io { .. }
        )
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::Io { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            NetworkError::Timeout { operation } => {
                format!("The {} timed out. The server may be slow or unreachable.", operation)
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                404 => "The requested endpoint was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::Io { .. } => {
                "The connection was interrupted while receiving the reply.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::Io { .. } => "E_NET_IO",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation } => write!(f, "{} timed out", operation),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::Io { message } => write!(f, "IO error: {}", message),
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a reqwest error into a NetworkError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> NetworkError {
    if err.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        NetworkError::Timeout {
            operation: "HTTP request".to_string(),
        }
    } else if err.is_status() {
        NetworkError::HttpStatus {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        NetworkError::Io {
            message: err.to_string(),
        }
    } else {
        NetworkError::Other {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_is_connectivity_loss() {
        let err = NetworkError::ConnectionFailed {
            url: "http://example.com".to_string(),
            message: "refused".to_string(),
        };
        assert!(err.is_connectivity_loss());
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_NET_CONN");
    }

    #[test]
    fn test_http_status_is_not_connectivity_loss() {
        let err = NetworkError::HttpStatus {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert!(!err.is_connectivity_loss());
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_NET_HTTP");
    }

    #[test]
    fn test_client_errors_not_retryable() {
        let err = NetworkError::HttpStatus {
            status: 400,
            message: "Bad Request".to_string(),
        };
        assert!(!err.is_retryable());

        let err = NetworkError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cancelled_not_retryable() {
        assert!(!NetworkError::Cancelled.is_retryable());
        assert!(!NetworkError::Cancelled.is_connectivity_loss());
    }

    #[test]
    fn test_user_message_is_readable() {
        let err = NetworkError::HttpStatus {
            status: 503,
            message: "upstream exploded: backtrace ...".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("server"));
        assert!(!msg.contains("backtrace"));
    }

    #[test]
    fn test_display_format() {
        let err = NetworkError::ConnectionFailed {
            url: "http://api.example.com".to_string(),
            message: "refused".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("api.example.com"));
        assert!(display.contains("refused"));
    }
}
