//! Error types for client construction and queue operations.

use thiserror::Error;

/// Top-level error returned by every public operation of the adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Fatal configuration error: {0}")]
    Fatal(#[from] FatalConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    /// Check if the error means the adapter can never be used in this process.
    ///
    /// The adapter does not exit on its own; hosts that terminate on missing
    /// credentials should abort when this returns `true`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The service failure behind this error, if any
    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}

/// Recoverable construction errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },

    #[error("Transport construction failed: {0}")]
    Transport(#[from] crate::transport::TransportError),
}

/// Credentials or region could not be resolved from the config or the environment
#[derive(Debug, Error)]
#[error("{} not found in client configuration or environment", .missing.join(", "))]
pub struct FatalConfigError {
    /// Environment variable names of the values that stayed empty
    pub missing: Vec<&'static str>,
}

/// Per-call request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },
}

impl ValidationError {
    pub(crate) fn required(field: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
        }
    }
}

/// Failures reported by, or while talking to, the queue service.
///
/// Values are carried as received; the adapter does not retry or reinterpret
/// them.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("HTTP request failed: {message}")]
    Transport { message: String },

    #[error("Service returned HTTP {status}: {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
        sender_fault: bool,
    },

    #[error("Malformed service response: {message}")]
    MalformedResponse { message: String },
}

impl ServiceError {
    /// Service error code for API errors (e.g. `AWS.SimpleQueueService.NonExistentQueue`)
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                message: e.to_string(),
            }
        } else if e.is_connect() {
            Self::ConnectionFailed {
                message: e.to_string(),
            }
        } else {
            Self::Transport {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
