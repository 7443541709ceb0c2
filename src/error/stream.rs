//! Streaming-related error types.
//!
//! These describe failures inside an already-open response stream: lost
//! connections, idle timeouts, malformed frames, and errors the backend
//! reports through the protocol itself.

use std::fmt;

/// Stream-specific error variants.
#[derive(Debug, Clone)]
pub enum StreamError {
    /// Stream connection was lost while the reply was being produced.
    ConnectionLost { message: String },

    /// Invalid JSON in a frame payload. Recovered locally: the frame is
    /// discarded and the stream continues.
    InvalidJson { message: String },

    /// No frame received within the idle window.
    IdleTimeout { duration_secs: u64 },

    /// Backend reported an error through the stream.
    BackendError { message: String },

    /// Generic stream error.
    Other { message: String },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. } | StreamError::IdleTimeout { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost while receiving the reply.".to_string()
            }
            StreamError::InvalidJson { .. } => {
                "Received invalid data from the server.".to_string()
            }
            StreamError::IdleTimeout { duration_secs } => format!(
                "No response from the server for {} seconds. The connection may have been lost.",
                duration_secs
            ),
            StreamError::BackendError { message } => message.clone(),
            StreamError::Other { message } => format!("Stream error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::InvalidJson { .. } => "E_STREAM_JSON",
            StreamError::IdleTimeout { .. } => "E_STREAM_IDLE",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::Other { .. } => "E_STREAM_OTHER",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::InvalidJson { message } => {
                write!(f, "Invalid JSON in stream frame: {}", message)
            }
            StreamError::IdleTimeout { duration_secs } => {
                write!(f, "Stream idle for {} seconds", duration_secs)
            }
            StreamError::BackendError { message } => write!(f, "Backend error: {}", message),
            StreamError::Other { message } => write!(f, "Stream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lost_is_retryable() {
        let err = StreamError::ConnectionLost {
            message: "socket closed".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_STREAM_CONN");
    }

    #[test]
    fn test_idle_timeout_message_names_duration() {
        let err = StreamError::IdleTimeout { duration_secs: 60 };
        assert!(err.is_retryable());
        assert!(err.user_message().contains("60 seconds"));
    }

    #[test]
    fn test_invalid_json_not_retryable() {
        let err = StreamError::InvalidJson {
            message: "expected value at line 1".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.error_code(), "E_STREAM_JSON");
    }

    #[test]
    fn test_backend_error_passes_reason_through() {
        let err = StreamError::BackendError {
            message: "Model quota exceeded".to_string(),
        };
        assert_eq!(err.user_message(), "Model quota exceeded");
        assert!(format!("{}", err).contains("Model quota exceeded"));
    }
}
