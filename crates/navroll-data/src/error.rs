//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching or parsing NAV data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error (connection failure, timeout, body read failure)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("HTTP {status} for code {scheme_code}")]
    Http {
        /// Scheme code that was queried
        scheme_code: String,
        /// HTTP status code returned by the API
        status: u16,
    },

    /// The response body is not a NAV payload
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Missing data
    #[error("No data returned for scheme {scheme_code}: {reason}")]
    MissingData {
        /// Scheme code that was queried
        scheme_code: String,
        /// Reason for missing data
        reason: String,
    },

    /// Invalid scheme code
    #[error("Invalid scheme code: {0:?}")]
    InvalidSchemeCode(String),
}

impl DataError {
    /// Whether an immediate second attempt could plausibly succeed.
    ///
    /// Transport failures, server errors and rate limiting are transient;
    /// client errors and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_names_code() {
        let err = DataError::Http {
            scheme_code: "100033".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "HTTP 500 for code 100033");
    }

    #[test]
    fn test_retryable_statuses() {
        let server = DataError::Http {
            scheme_code: "1".to_string(),
            status: 503,
        };
        let throttled = DataError::Http {
            scheme_code: "1".to_string(),
            status: 429,
        };
        let not_found = DataError::Http {
            scheme_code: "1".to_string(),
            status: 404,
        };

        assert!(server.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!DataError::Parse("bad".to_string()).is_retryable());
    }
}
