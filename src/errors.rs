//! # Fetch Error Types Module
//!
//! This module defines the error types raised inside the outbound HTTP layer and
//! the language-model client. None of them reach the user: providers turn them
//! into "no result" and the pipeline degrades to the next stage.

/// Custom error types for outbound calls
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection and other transport errors
    Transport(String),
    /// Timeout errors
    Timeout(String),
    /// Non-200 HTTP status
    Status(u16),
    /// Body could not be decoded into the expected shape
    Decode(String),
    /// Circuit breaker is open for the endpoint
    CircuitOpen(String),
    /// No credential configured for a credentialed endpoint
    MissingCredential,
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::Timeout(_) | FetchError::Status(_)
        )
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FetchError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            FetchError::Status(code) => write!(f, "Unexpected HTTP status: {code}"),
            FetchError::Decode(msg) => write!(f, "Decode error: {msg}"),
            FetchError::CircuitOpen(msg) => write!(f, "Circuit open: {msg}"),
            FetchError::MissingCredential => write!(f, "Missing credential"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        assert_eq!(
            FetchError::Timeout("8s elapsed".to_string()).to_string(),
            "Timeout error: 8s elapsed"
        );
        assert_eq!(FetchError::Status(503).to_string(), "Unexpected HTTP status: 503");
        assert_eq!(FetchError::MissingCredential.to_string(), "Missing credential");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FetchError::Status(500).is_retryable());
        assert!(FetchError::Transport("refused".into()).is_retryable());
        assert!(!FetchError::Decode("bad json".into()).is_retryable());
        assert!(!FetchError::CircuitOpen("lm".into()).is_retryable());
    }

    #[test]
    fn test_from_serde_error() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
