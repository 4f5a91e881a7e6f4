//! Command Reports
//!
//! Every `envctl` command prints exactly one [`Report`] on stdout. A report
//! carries either the command's `data` or a structured `error`, never both,
//! and always echoes what was asked of the server in `meta`:
//!
//! ```json
//! {"ok":true,"endpoint":"http://localhost:8080/mcp","command":"names",
//!  "data":["dev","prod"],"meta":{"execution_ms":3,"requests":1,"include_disabled":false,"items_returned":2}}
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{EnvctlError, Result};

/// Outcome of one command against one MCP endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<T> {
    pub ok: bool,

    /// Endpoint the command talked to; empty when configuration failed first
    pub endpoint: String,

    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    pub meta: Metadata,
}

impl<T> Report<T> {
    /// Build the report for a finished command
    pub fn from_result(
        endpoint: impl Into<String>,
        command: impl Into<String>,
        result: Result<T>,
        meta: Metadata,
    ) -> Self {
        let (data, error) = match result {
            Ok(data) => (Some(data), None),
            Err(err) => (None, Some(ErrorInfo::from(&err))),
        };
        Self {
            ok: error.is_none(),
            endpoint: endpoint.into(),
            command: command.into(),
            data,
            error,
            meta,
        }
    }
}

impl Report<()> {
    /// Report a command that failed before it produced any data
    pub fn failure(
        endpoint: impl Into<String>,
        command: impl Into<String>,
        err: &EnvctlError,
        meta: Metadata,
    ) -> Self {
        Self {
            ok: false,
            endpoint: endpoint.into(),
            command: command.into(),
            data: None,
            error: Some(ErrorInfo::from(err)),
            meta,
        }
    }
}

/// Stable error code plus message, and a remedy when one is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&EnvctlError> for ErrorInfo {
    fn from(err: &EnvctlError) -> Self {
        Self { code: err.error_code().to_string(), message: err.message(), hint: err.hint() }
    }
}

/// What the command asked for and what it cost
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub execution_ms: u64,

    /// JSON-RPC requests issued while running the command
    pub requests: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_disabled: Option<bool>,

    /// Environment looked up by name (`info`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Environments, names or tools in `data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_returned: Option<usize>,
}

impl Metadata {
    /// Metadata for a command that started at `started` and issued `requests` calls
    #[must_use]
    pub fn since(started: Instant, requests: u64) -> Self {
        let execution_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Self { execution_ms, requests, ..Self::default() }
    }

    #[must_use]
    pub const fn include_disabled(mut self, include_disabled: bool) -> Self {
        self.include_disabled = Some(include_disabled);
        self
    }

    #[must_use]
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    #[must_use]
    pub const fn items(mut self, count: usize) -> Self {
        self.items_returned = Some(count);
        self
    }
}
