//! Error types for Linode API operations.
//!
//! This module provides the error hierarchy shared by every resource crate,
//! including the structured [`ApiError`] built from non-2xx responses.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Linode operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Request body could not be represented as JSON
    #[error("Failed to serialize request: {0}")]
    SerializationError(String),

    /// The API answered with a non-2xx status
    #[error("API error: {0}")]
    ApiError(ApiError),

    /// Network failure while talking to the API
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Request was cancelled by the caller
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// Invalid arguments supplied by the caller
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint or path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Linode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// One reason entry of an API error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReason {
    /// Human-readable explanation
    pub reason: String,
    /// Request field the reason applies to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field.as_deref() {
            Some(field) if !field.is_empty() => write!(f, "[{field}] {}", self.reason),
            _ => f.write_str(&self.reason),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

/// Structured error produced from a non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Flattened message
    pub message: String,
    /// Per-field validation details, when the body carried any
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<ErrorReason>,
}

impl ApiError {
    /// Build an error from a status code and a raw response body.
    ///
    /// Bodies of the form `{"errors": [{"reason": "...", "field": "..."}]}` are
    /// flattened into `message`; anything else is used verbatim, and an empty
    /// body falls back to the canonical status text.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let reasons = serde_json::from_str::<ErrorBody>(body)
            .map(|parsed| parsed.errors)
            .unwrap_or_default();

        let message = if reasons.is_empty() {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        } else {
            reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };

        Self {
            status: status.as_u16(),
            message,
            reasons,
        }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns true for 404 responses.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Returns true for statuses worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.status, 429 | 502 | 503 | 504)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:03}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::ApiError(_) => "API_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Cancelled(_) => "CANCELLED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true if the HTTP layer may retry the request that produced this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(api) => api.is_retryable(),
            Self::TransportError(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// Returns the API error, if this is one.
    #[must_use]
    pub const fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::ApiError(api) => Some(api),
            _ => None,
        }
    }

    /// Returns true if the API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError(api) if api.is_not_found())
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::ApiError(err)
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::TransportError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::DecodeError("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::SerializationError("test".to_string()).error_code(),
            "SERIALIZATION_ERROR"
        );
        assert_eq!(
            Error::ApiError(ApiError::from_response(StatusCode::NOT_FOUND, "")).error_code(),
            "API_ERROR"
        );
        assert_eq!(
            Error::TransportError("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(Error::Cancelled("test".to_string()).error_code(), "CANCELLED");
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_api_error_from_reasons() {
        let body = r#"{"errors": [
            {"reason": "Label must be unique", "field": "label"},
            {"reason": "Region is not available"}
        ]}"#;
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.status, 400);
        assert_eq!(err.reasons.len(), 2);
        assert_eq!(
            err.message,
            "[label] Label must be unique; Region is not available"
        );
        assert_eq!(
            err.to_string(),
            "[400] [label] Label must be unique; Region is not available"
        );
    }

    #[test]
    fn test_api_error_plain_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream went away\n");
        assert_eq!(err.message, "upstream went away");
        assert!(err.reasons.is_empty());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_api_error_empty_body_uses_status_text() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.message, "Not Found");
        assert!(err.is_not_found());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_empty_reason_list_falls_back_to_body() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, r#"{"errors": []}"#);
        assert_eq!(err.message, r#"{"errors": []}"#);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Timeout("slow".to_string()).is_retryable());
        assert!(Error::TransportError("reset".to_string()).is_retryable());
        assert!(Error::from(ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, "")).is_retryable());

        assert!(!Error::from(ApiError::from_response(StatusCode::BAD_REQUEST, "")).is_retryable());
        assert!(!Error::DecodeError("bad".to_string()).is_retryable());
        assert!(!Error::Cancelled("stop".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::from(ApiError::from_response(StatusCode::NOT_FOUND, ""));
        assert_eq!(err.to_string(), "API error: [404] Not Found");
        assert!(err.is_not_found());

        let err = Error::Cancelled("listing aborted".to_string());
        assert_eq!(err.to_string(), "Request cancelled: listing aborted");
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let linode_err: Error = err.into();
        assert!(matches!(linode_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let linode_err: Error = err.into();
        assert!(matches!(linode_err, Error::DecodeError(_)));
    }

    #[test]
    fn test_api_error_serialization_skips_empty_reasons() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("404"));
        assert!(!json.contains("reasons"));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::DecodeError("test".to_string());
        let err2 = Error::DecodeError("test".to_string());
        let err3 = Error::DecodeError("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
