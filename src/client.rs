//! Environment Query Client
//!
//! Domain operations over the MCP server's `list_environments` tool. Every
//! operation is exactly one `tools/call` round trip; nothing is cached, so
//! two calls may observe different listings.
//!
//! # Operations
//! - [`EnvironmentClient::list_environments`] - typed listing
//! - [`EnvironmentClient::environment_names`] - names in server order
//! - [`EnvironmentClient::default_environment_name`] - default environment
//! - [`EnvironmentClient::environment_info`] - one descriptor by name,
//!   disabled environments included
//! - [`EnvironmentClient::list_tools`] - tools exposed by the server

use serde_json::json;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::environment::{EnvironmentDescriptor, EnvironmentListing};
use crate::error::{EnvctlError, Result};
use crate::rpc::{ToolDescriptor, ToolList, METHOD_TOOLS_LIST};
use crate::transport::{HttpTransport, Transport};

/// Name of the server-side tool every environment query goes through
pub const TOOL_LIST_ENVIRONMENTS: &str = "list_environments";

/// Client for querying database environments
#[derive(Debug)]
pub struct EnvironmentClient<T = HttpTransport> {
    transport: T,
}

impl EnvironmentClient<HttpTransport> {
    /// Create a client for `endpoint` with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(endpoint)?))
    }

    /// Create a client from a resolved configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_timeout(config.endpoint.clone(), config.timeout())?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> EnvironmentClient<T> {
    /// Create a client over an arbitrary transport
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// List environments, optionally including disabled ones
    ///
    /// The server decides order and filtering; both are passed through as-is.
    pub fn list_environments(&self, include_disabled: bool) -> Result<EnvironmentListing> {
        let result = self
            .transport
            .call_tool(TOOL_LIST_ENVIRONMENTS, json!({ "include_disabled": include_disabled }))?;

        let listing: EnvironmentListing = serde_json::from_value(result).map_err(|e| {
            EnvctlError::transport(format!("Malformed {TOOL_LIST_ENVIRONMENTS} result: {e}"))
        })?;

        for issue in listing.inconsistencies() {
            warn!(include_disabled, "inconsistent environment listing: {issue}");
        }
        debug!(
            include_disabled,
            count = listing.environments.len(),
            "listed environments"
        );

        Ok(listing)
    }

    /// Environment names in server order
    pub fn environment_names(&self, include_disabled: bool) -> Result<Vec<String>> {
        Ok(self.list_environments(include_disabled)?.names())
    }

    /// Name of the default environment, from a listing without disabled environments
    ///
    /// Returns `None` when the server has no default configured.
    pub fn default_environment_name(&self) -> Result<Option<String>> {
        Ok(self.list_environments(false)?.default_environment)
    }

    /// Full descriptor of the environment called `name`
    ///
    /// Disabled environments are included in the search. If the server lists
    /// the name more than once, the first entry wins.
    pub fn environment_info(&self, name: &str) -> Result<EnvironmentDescriptor> {
        let listing = self.list_environments(true)?;

        let mut matches = listing.environments.into_iter().filter(|env| env.name == name);
        let found = matches.next().ok_or_else(|| EnvctlError::not_found(name))?;

        let extra = matches.count();
        if extra > 0 {
            warn!(
                environment = name,
                duplicates = extra,
                "environment listed more than once; using first entry"
            );
        }

        Ok(found)
    }

    /// Tools exposed by the server (`tools/list`)
    pub fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let result = self.transport.call(METHOD_TOOLS_LIST, json!({}))?;
        let list: ToolList = serde_json::from_value(result).map_err(|e| {
            EnvctlError::transport(format!("Malformed {METHOD_TOOLS_LIST} result: {e}"))
        })?;
        Ok(list.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentStatus;
    use crate::rpc::METHOD_TOOLS_CALL;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::cell::RefCell;

    /// In-memory transport serving a fixed set of environments
    struct FixtureTransport {
        environments: Vec<Value>,
        default: Option<String>,
        calls: RefCell<Vec<(String, Value)>>,
    }

    impl FixtureTransport {
        fn new(environments: Vec<Value>, default: Option<&str>) -> Self {
            Self {
                environments,
                default: default.map(ToString::to_string),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for FixtureTransport {
        fn call(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.borrow_mut().push((method.to_string(), params.clone()));

            match method {
                METHOD_TOOLS_CALL => {
                    assert_eq!(params["name"], TOOL_LIST_ENVIRONMENTS);
                    let include_disabled =
                        params["arguments"]["include_disabled"].as_bool().unwrap_or(false);
                    let environments: Vec<Value> = self
                        .environments
                        .iter()
                        .filter(|env| include_disabled || env["status"] == "enabled")
                        .cloned()
                        .collect();
                    Ok(json!({
                        "total_count": environments.len(),
                        "environments": environments,
                        "default_environment": self.default,
                    }))
                }
                METHOD_TOOLS_LIST => Ok(json!({
                    "tools": [{"name": TOOL_LIST_ENVIRONMENTS, "inputSchema": {"type": "object"}}]
                })),
                other => Err(EnvctlError::protocol(json!({
                    "code": -32601,
                    "message": format!("Unknown method: {other}")
                }))),
            }
        }
    }

    fn env(name: &str, status: &str, is_default: bool) -> Value {
        json!({
            "name": name,
            "description": format!("{name} environment"),
            "status": status,
            "is_default": is_default,
            "connection_info": {
                "host": "127.0.0.1",
                "port": 3306,
                "database": name,
                "username": "reader"
            },
            "pool_config": {"min_connections": 2, "max_connections": 20}
        })
    }

    fn fixture() -> EnvironmentClient<FixtureTransport> {
        EnvironmentClient::with_transport(FixtureTransport::new(
            vec![
                env("dev", "enabled", false),
                env("uat", "disabled", false),
                env("prod", "enabled", true),
            ],
            Some("prod"),
        ))
    }

    #[test]
    fn test_list_environments_filters_disabled_by_request() {
        let client = fixture();

        let enabled = client.list_environments(false).unwrap();
        assert_eq!(enabled.total_count, 2);
        assert_eq!(enabled.names(), vec!["dev", "prod"]);

        let all = client.list_environments(true).unwrap();
        assert_eq!(all.total_count, 3);
        assert_eq!(all.environments[1].status, EnvironmentStatus::Disabled);
    }

    #[test]
    fn test_request_shape() {
        let client = fixture();
        client.list_environments(true).unwrap();

        let calls = client.transport().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "tools/call");
        assert_eq!(
            calls[0].1,
            json!({"name": "list_environments", "arguments": {"include_disabled": true}})
        );
    }

    #[test]
    fn test_environment_names_match_total_count() {
        let client = fixture();
        let names = client.environment_names(true).unwrap();
        let listing = client.list_environments(true).unwrap();
        assert_eq!(names.len(), listing.total_count);
        assert_eq!(names, vec!["dev", "uat", "prod"]);
    }

    #[test]
    fn test_default_environment_name() {
        let client = fixture();
        assert_eq!(client.default_environment_name().unwrap().as_deref(), Some("prod"));

        let calls = client.transport().calls.borrow();
        assert_eq!(calls[0].1["arguments"]["include_disabled"], false);
    }

    #[test]
    fn test_default_environment_absent() {
        let client = EnvironmentClient::with_transport(FixtureTransport::new(
            vec![env("dev", "enabled", false)],
            None,
        ));
        assert_eq!(client.default_environment_name().unwrap(), None);
    }

    #[test]
    fn test_environment_info_finds_disabled() {
        let client = fixture();
        let uat = client.environment_info("uat").unwrap();
        assert_eq!(uat.name, "uat");
        assert_eq!(uat.status, EnvironmentStatus::Disabled);

        let calls = client.transport().calls.borrow();
        assert_eq!(calls[0].1["arguments"]["include_disabled"], true);
    }

    #[test]
    fn test_environment_info_not_found() {
        let client = fixture();
        let err = client.environment_info("missing").unwrap_err();
        assert!(matches!(&err, EnvctlError::NotFound(name) if name == "missing"));
    }

    #[test]
    fn test_environment_info_first_match_on_duplicates() {
        let mut second = env("dup", "enabled", false);
        second["connection_info"]["host"] = json!("second.internal");
        let client = EnvironmentClient::with_transport(FixtureTransport::new(
            vec![env("dup", "enabled", false), second],
            None,
        ));

        let found = client.environment_info("dup").unwrap();
        assert_eq!(found.connection_info.host, "127.0.0.1");
    }

    #[test]
    fn test_malformed_listing_is_transport_failure() {
        let mut broken = env("dev", "enabled", false);
        broken.as_object_mut().unwrap().remove("pool_config");
        let client =
            EnvironmentClient::with_transport(FixtureTransport::new(vec![broken], None));

        let err = client.list_environments(false).unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_FAILED");
        assert!(err.message().contains("pool_config"));
    }

    #[test]
    fn test_listing_without_usernames() {
        // connection_info as a multi-environment MySQL server reports it
        let server_entry = |name: &str, status: &str, is_default: bool| {
            json!({
                "name": name,
                "description": null,
                "status": status,
                "is_default": is_default,
                "is_legacy": false,
                "connection_info": {
                    "host": "mysql.internal",
                    "port": 3306,
                    "database": name,
                    "password_configured": true
                },
                "pool_config": {
                    "max_connections": 10,
                    "min_connections": 1,
                    "connection_timeout": 30,
                    "idle_timeout": null
                }
            })
        };
        let client = EnvironmentClient::with_transport(FixtureTransport::new(
            vec![server_entry("prod", "enabled", true), server_entry("uat", "invalid", false)],
            Some("prod"),
        ));

        assert_eq!(client.environment_names(false).unwrap(), vec!["prod"]);
        assert_eq!(client.default_environment_name().unwrap().as_deref(), Some("prod"));

        let uat = client.environment_info("uat").unwrap();
        assert_eq!(uat.status, EnvironmentStatus::Invalid);
        assert!(uat.connection_info.username.is_none());
        assert_eq!(uat.connection_info.password_configured, Some(true));
        assert_eq!(uat.connection_info.dsn(), "mysql.internal:3306/uat");
        assert!(uat.pool_config.idle_timeout.is_none());
    }

    #[test]
    fn test_list_tools() {
        let client = fixture();
        let tools = client.list_tools().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "list_environments");

        let calls = client.transport().calls.borrow();
        assert_eq!(calls[0].0, "tools/list");
        assert_eq!(calls[0].1, json!({}));
    }
}
