//! Inference failure taxonomy.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// What went wrong talking to the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InferenceErrorKind {
    /// Connection, DNS, or body read failure.
    #[display("transport")]
    Transport,
    /// The request deadline elapsed.
    #[display("timeout")]
    Timeout,
    /// The service answered with a non-success status.
    #[display("service status {}", status)]
    Service {
        /// HTTP status code.
        status: u16,
    },
    /// The answer was missing a move, unparseable, or illegal here.
    #[display("malformed response")]
    Malformed,
}

/// Inference error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Inference error ({}): {} at {}:{}", kind, message, file, line)]
pub struct InferenceError {
    /// Failure category.
    pub kind: InferenceErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl InferenceError {
    /// Creates a new inference error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: InferenceErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(%kind, error_message = %message, "Inference error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Transport failure.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(InferenceErrorKind::Transport, message)
    }

    /// Deadline exceeded.
    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(InferenceErrorKind::Timeout, message)
    }

    /// Unusable response.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(InferenceErrorKind::Malformed, message)
    }

    /// Short description suitable for the session's error field.
    pub fn summary(&self) -> String {
        match self.kind {
            InferenceErrorKind::Transport => format!("Engine unreachable: {}", self.message),
            InferenceErrorKind::Timeout => format!("Engine timed out: {}", self.message),
            InferenceErrorKind::Service { status } => {
                format!("Engine error (HTTP {}): {}", status, self.message)
            }
            InferenceErrorKind::Malformed => format!("Engine returned a bad move: {}", self.message),
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timed out: {}", err))
        } else if err.is_decode() {
            Self::malformed(format!("Undecodable response: {}", err))
        } else {
            Self::transport(format!("Request failed: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_kind() {
        let err = InferenceError::timeout("after 15s");
        assert_eq!(err.kind, InferenceErrorKind::Timeout);
        assert!(err.summary().contains("timed out"));

        let err = InferenceError::new(InferenceErrorKind::Service { status: 404 }, "Model not found");
        assert!(err.summary().contains("404"));
        assert!(err.summary().contains("Model not found"));
    }

    #[test]
    fn test_display_includes_location() {
        let err = InferenceError::malformed("missing move");
        let text = err.to_string();
        assert!(text.contains("malformed response"));
        assert!(text.contains("error.rs"));
    }
}
