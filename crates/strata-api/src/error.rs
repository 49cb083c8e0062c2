//! Error types for the Strata API client
//!
//! All transport-level failures surface as [`ApiError`]. Helper methods
//! classify errors by HTTP status range so callers can decide whether a
//! failure is worth retrying without matching on variants.

use thiserror::Error;

/// Errors returned by the Strata API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication or authorization failure (401/403)
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The requested resource does not exist (404)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// The control plane is throttling requests (429)
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Client-side API error (4xx other than the above)
    #[error("API error (HTTP {code}): {message}")]
    Api { code: u16, message: String },

    /// Server-side error (5xx)
    #[error("Server error (HTTP {code}): {message}")]
    Server { code: u16, message: String },

    /// The request could not be completed (network, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Client construction or endpoint configuration error
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::AuthenticationFailed { .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Server { .. })
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// Returns true if this error is potentially retryable
    ///
    /// Server errors, throttling, and transport timeouts/connection resets
    /// may succeed on a later attempt. Everything else is permanent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Server { .. } | ApiError::RateLimited { .. } => true,
            ApiError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if any
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationFailed { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Api { code, .. } | ApiError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::NotFound {
            message: "volume 'vol0' not found".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert_eq!(err.http_status(), Some(404));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = ApiError::Server {
            code: 503,
            message: "service unavailable".to_string(),
        };
        assert!(err.is_server_error());
        assert!(err.is_retryable());
        assert_eq!(err.http_status(), Some(503));
    }

    #[test]
    fn test_client_error_is_permanent() {
        let err = ApiError::Api {
            code: 400,
            message: "invalid size".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_rate_limited_is_retryable() {
        let err = ApiError::RateLimited {
            message: "slow down".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unauthorized_classification() {
        let err = ApiError::AuthenticationFailed {
            message: "bad credentials".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_retryable());
    }
}
