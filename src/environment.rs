//! Environment Descriptors
//!
//! Typed view of the `list_environments` tool result. An environment is a
//! named database connection profile plus pool sizing, which the server may
//! mark enabled, disabled, or invalid, with at most one marked default.
//!
//! Parsing fails on any missing required field, so a listing that
//! deserializes is safe to index without further checks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Environment status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentStatus {
    /// Environment is enabled and accepts connections
    Enabled,
    /// Environment is disabled in server configuration
    Disabled,
    /// Environment configuration failed server-side validation
    Invalid,
}

impl EnvironmentStatus {
    /// Get the status as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection parameters of an environment (credentials are never sent)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub database: String,

    /// Login name; servers that only report whether a password is set omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Whether the server has a password configured for this environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_configured: Option<bool>,
}

impl ConnectionInfo {
    /// `username@host:port/database`, or `host:port/database` without a username
    #[must_use]
    pub fn dsn(&self) -> String {
        match &self.username {
            Some(username) => {
                format!("{username}@{}:{}/{}", self.host, self.port, self.database)
            }
            None => format!("{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

/// Connection pool sizing of an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,

    /// Idle timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u64>,
}

/// One entry of an environment listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDescriptor {
    pub name: String,

    /// Free-form description; the server sends `null` when unset
    pub description: Option<String>,

    pub status: EnvironmentStatus,
    pub is_default: bool,

    /// Whether the environment came from a single-database legacy config
    #[serde(default)]
    pub is_legacy: bool,

    pub connection_info: ConnectionInfo,
    pub pool_config: PoolConfig,
}

impl EnvironmentDescriptor {
    /// Whether the environment is enabled
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status == EnvironmentStatus::Enabled
    }
}

/// Result of the `list_environments` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentListing {
    /// Server-determined order, preserved as received
    pub environments: Vec<EnvironmentDescriptor>,

    pub total_count: usize,

    /// Name of the default environment; `null` when none is configured
    pub default_environment: Option<String>,
}

impl EnvironmentListing {
    /// Environment names in listing order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.environments.iter().map(|env| env.name.clone()).collect()
    }

    /// First environment whose name equals `name`
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&EnvironmentDescriptor> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Names that occur more than once, in order of their second occurrence
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.environments
            .iter()
            .map(|env| env.name.as_str())
            .filter(|name| !seen.insert(*name))
            .collect()
    }

    /// Describe every way this listing breaks the server's documented invariants
    ///
    /// Returns an empty vector for a consistent listing.
    #[must_use]
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.total_count != self.environments.len() {
            issues.push(format!(
                "total_count is {} but {} environments were listed",
                self.total_count,
                self.environments.len()
            ));
        }

        let defaults: Vec<&str> = self
            .environments
            .iter()
            .filter(|env| env.is_default)
            .map(|env| env.name.as_str())
            .collect();
        if defaults.len() > 1 {
            issues.push(format!("multiple environments marked default: {}", defaults.join(", ")));
        }

        if let Some(default) = &self.default_environment {
            // A filtered listing may legitimately omit a disabled default
            if let Some(env) = self.find(default) {
                if !env.is_default {
                    issues.push(format!("default environment '{default}' is not flagged is_default"));
                }
            }
        }

        for env in &self.environments {
            if env.name.is_empty() {
                issues.push("environment with empty name".to_string());
            }
            let pool = &env.pool_config;
            if pool.min_connections > pool.max_connections {
                issues.push(format!(
                    "environment '{}' has min_connections {} > max_connections {}",
                    env.name, pool.min_connections, pool.max_connections
                ));
            }
        }

        for name in self.duplicate_names() {
            issues.push(format!("environment name '{name}' is listed more than once"));
        }

        issues
    }
}
