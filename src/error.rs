//! Error types for the location resolver
//!
//! `ResolverError` covers everything a caller of the HTTP endpoint can see.
//! `ProviderError` describes a single failed upstream call; those are logged
//! and absorbed by the fallback chain and never reach the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the location resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Latitude or longitude missing from the request
    #[error("Latitude and longitude are required")]
    InvalidInput,

    /// Latitude or longitude present but not a finite number
    #[error("Invalid latitude or longitude")]
    UnparseableNumber,

    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    #[error("Latitude must be between -90 and 90 and longitude between -180 and 180")]
    OutOfRange,

    /// No provider API key was provisioned at startup
    #[error("Location service not configured")]
    Misconfiguration,

    /// Configuration file or environment could not be turned into a valid config
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ResolverError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status reported to the caller for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolverError::InvalidInput
            | ResolverError::UnparseableNumber
            | ResolverError::OutOfRange => StatusCode::BAD_REQUEST,
            ResolverError::Misconfiguration | ResolverError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ResolverError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Failure of a single upstream geocoding call
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Provider returned status {status}: {body}")]
    NonSuccessStatus { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider response contained no address")]
    EmptyResult,
}

// URLs are stripped because the query string may carry the API key.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(
            ResolverError::InvalidInput.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResolverError::UnparseableNumber.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResolverError::OutOfRange.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_misconfiguration_is_server_error() {
        let err = ResolverError::Misconfiguration;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Location service not configured");
    }

    #[test]
    fn test_config_error_creation() {
        let err = ResolverError::config("timeout too large");
        assert!(matches!(err, ResolverError::Config { .. }));
        assert!(err.to_string().contains("timeout too large"));
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ResolverError::InvalidInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Latitude and longitude are required");
    }

    #[test]
    fn test_non_success_status_message() {
        let err = ProviderError::NonSuccessStatus {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Provider returned status 503: unavailable");
    }
}
