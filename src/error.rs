//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout envctl.
//! All errors are structured and map to specific error codes for JSON output.
//!
//! # Error Categories
//! - `ConnectionFailed`: The MCP server could not be reached at all
//! - `TransportFailed`: Any other HTTP-level failure (status, timeout, malformed body)
//! - `Protocol`: The server answered with a JSON-RPC `error` member
//! - `NotFound`: A requested environment is absent from the full listing
//! - `ConfigError`: Configuration file errors (CLI layer only)

use serde_json::Value;
use thiserror::Error;

/// Main error type for envctl operations
#[derive(Error, Debug)]
pub enum EnvctlError {
    /// The TCP connection to the endpoint could not be established
    #[error("Connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Non-success HTTP status, timeout, or an unparseable response body
    #[error("Transport failed: {message}")]
    TransportFailed { status: Option<u16>, message: String },

    /// JSON-RPC error returned by the server
    #[error("MCP error: {message}")]
    Protocol {
        message: String,
        code: Option<i64>,
        /// The server's `error` member exactly as received
        payload: Value,
    },

    /// Requested environment does not exist
    #[error("Environment '{0}' not found")]
    NotFound(String),

    /// Configuration error (file not found, invalid JSON, etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EnvctlError {
    /// Convert error to error code string for JSON output
    ///
    /// Error codes are stable and suitable for programmatic handling.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed { .. } => "CONNECTION_FAILED",
            Self::TransportFailed { .. } => "TRANSPORT_FAILED",
            Self::Protocol { .. } => "PROTOCOL_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Get human-readable error message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Actionable hint for the user, if one exists for this error kind
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConnectionFailed { endpoint, .. } => {
                Some(format!("Is the MCP server running at {endpoint}?"))
            }
            _ => None,
        }
    }

    /// Whether the server was unreachable
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Create a connection failed error
    pub fn connection_failed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed { endpoint: endpoint.into(), reason: reason.into() }
    }

    /// Create a transport error without an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailed { status: None, message: message.into() }
    }

    /// Create a transport error for a non-success HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::TransportFailed { status: Some(status), message: message.into() }
    }

    /// Create a protocol error from a JSON-RPC `error` member
    ///
    /// The message is taken from `error.message` when present, otherwise the
    /// payload's JSON text is used.
    pub fn protocol(payload: Value) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| payload.to_string(), ToString::to_string);
        let code = payload.get("code").and_then(Value::as_i64);

        Self::Protocol { message, code, payload }
    }

    /// Create a not-found error for an environment name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for envctl operations
pub type Result<T> = std::result::Result<T, EnvctlError>;
