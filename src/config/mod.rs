//! Configuration Management
//!
//! This module resolves where the client talks to and how long it waits.
//! The library core only ever sees a resolved [`ClientConfig`]; file lookup
//! and precedence exist for the CLI.
//!
//! # Configuration Locations
//! - Explicit: a path passed with `--config` (must exist)
//! - Local: `.envctl/config.json` (team-shareable, per-project)
//! - Global: `~/.config/envctl/config.json` (per-user)
//!
//! The first existing file in that order is used; files are not merged.
//!
//! # Resolution Precedence
//! 1. Explicit command-line values (highest priority)
//! 2. Values from the located config file
//! 3. Built-in defaults (`http://localhost:8080/mcp`, 30 seconds)
//!
//! # File Format
//! ```json
//! { "endpoint": "http://db-gateway:8080/mcp", "timeout_ms": 5000 }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{EnvctlError, Result};
use crate::transport::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL
    pub endpoint: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `endpoint` with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Self::default() }
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the endpoint is an HTTP(S) URL and the timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(EnvctlError::config_error(format!(
                "Endpoint must be an http:// or https:// URL, got '{}'",
                self.endpoint
            )));
        }
        if self.timeout_ms == 0 {
            return Err(EnvctlError::config_error("timeout_ms must be greater than zero"));
        }
        Ok(())
    }
}

/// Partially specified configuration (a config file or command-line flags)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl PartialConfig {
    /// Fill fields missing in `self` from `lower`
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            endpoint: self.endpoint.or(lower.endpoint),
            timeout_ms: self.timeout_ms.or(lower.timeout_ms),
        }
    }

    /// Apply defaults and validate
    pub fn finish(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Get path to local config file (`.envctl/config.json`)
pub fn local_config_path() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().map_err(|e| {
        EnvctlError::config_error(format!("Could not determine current directory: {e}"))
    })?;

    Ok(current_dir.join(".envctl").join("config.json"))
}

/// Get path to global config file (`~/.config/envctl/config.json`)
pub fn global_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| EnvctlError::config_error("Could not determine user config directory"))?;

    Ok(config_dir.join("envctl").join("config.json"))
}

/// Load a config file
pub fn load_config_file(path: &Path) -> Result<PartialConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        EnvctlError::config_error(format!("Could not read config file {}: {e}", path.display()))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        EnvctlError::config_error(format!("Invalid config file {}: {e}", path.display()))
    })
}

/// Find the config file to use, if any
///
/// An explicit path must exist. Without one, the local file is preferred over
/// the global file.
pub fn locate_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(EnvctlError::config_error(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = local_config_path()?;
    if local.exists() {
        return Ok(Some(local));
    }

    // A missing home directory only disables the global lookup
    match global_config_path() {
        Ok(global) if global.exists() => Ok(Some(global)),
        _ => Ok(None),
    }
}

/// Resolve the client configuration with precedence
///
/// `overrides` come from the command line and win over any file value.
pub fn resolve_config(explicit: Option<&Path>, overrides: PartialConfig) -> Result<ClientConfig> {
    let from_file = match locate_config(explicit)? {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            load_config_file(&path)?
        }
        None => PartialConfig::default(),
    };

    overrides.or(from_file).finish()
}
