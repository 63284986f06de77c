//! Centralized error types for the FarmDash backend.
//!
//! This module provides a typed error hierarchy that:
//! - Classifies every failure into a client, configuration, upstream or unexpected error
//! - Maps each class onto an HTTP status code
//! - Produces the JSON `{ error, details }` body returned to API callers

use serde::Serialize;
use thiserror::Error;

/// Top-level application error type.
///
/// Errors from the weather, chat and storage crates convert into this type
/// before they reach the HTTP surface. Use `status_code()` and `to_body()`
/// to render them.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller sent a request that cannot be served (missing or malformed input).
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An upstream API answered with a non-success status. The body is kept
    /// verbatim so it can be forwarded.
    #[error("Upstream {service} returned status {status}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Service-level failures that carry a diagnostic for the caller.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// JSON body returned for every failed API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn missing_setting(setting: impl Into<String>) -> Self {
        Self::Config(ConfigError::MissingSetting(setting.into()))
    }

    /// HTTP status code for this error class.
    ///
    /// Upstream errors keep the upstream status so the weather proxy can
    /// forward it; callers that want a generic failure convert to `Service` first.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::Upstream { status, .. } => *status,
            AppError::Config(_)
            | AppError::Network(_)
            | AppError::Storage(_)
            | AppError::Service(_)
            | AppError::Other(_) => 500,
        }
    }

    /// Render the JSON error body.
    ///
    /// Client and configuration errors put the precise message in `error`
    /// (configuration errors name the missing setting). Everything else
    /// uses a short summary with the diagnostic in `details`.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            AppError::InvalidInput(msg) => ErrorBody::new(msg.clone()),
            AppError::Config(e) => ErrorBody::new(e.to_string()),
            AppError::Upstream { service, body, .. } => {
                ErrorBody::new(format!("{} request failed", service)).with_details(body.clone())
            }
            AppError::Network(e) => {
                ErrorBody::new("Upstream request failed").with_details(e.to_string())
            }
            AppError::Storage(msg) => ErrorBody::new("Storage failure").with_details(msg.clone()),
            AppError::Service(msg) => ErrorBody::new("Request failed").with_details(msg.clone()),
            AppError::Other(e) => ErrorBody::new("Internal server error").with_details(e.to_string()),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    /// The request URL is dropped; upstream query strings can carry API keys.
    fn into_network_error(self) -> NetworkError {
        let err = self.without_url();
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            NetworkError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(err.to_string())
        }
    }
}
