//! envctl - Database Environment Client for MySQL MCP Servers
//!
//! envctl queries the named database environments (connection profiles with
//! pool sizing) that a multi-environment MySQL MCP server exposes through its
//! `list_environments` tool, using JSON-RPC 2.0 over synchronous HTTP POST.
//!
//! # Core Principles
//! - One operation, one HTTP round trip (no caching, no retries)
//! - Typed envelopes and descriptors that fail fast on missing fields
//! - Distinct error kinds for unreachable server, transport failure,
//!   JSON-RPC error, and unknown environment
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`rpc`] - JSON-RPC 2.0 request/response envelopes
//! - [`transport`] - Transport trait and blocking HTTP implementation
//! - [`environment`] - Environment descriptor and listing types
//! - [`client`] - Environment query operations
//! - [`config`] - Configuration management
//! - [`output`] - JSON command reports printed by the CLI
//!
//! # Usage
//!
//! ```no_run
//! use envctl::EnvironmentClient;
//!
//! fn main() -> envctl::Result<()> {
//!     let client = EnvironmentClient::new("http://localhost:8080/mcp")?;
//!
//!     for name in client.environment_names(true)? {
//!         println!("{name}");
//!     }
//!
//!     let uat = client.environment_info("uat")?;
//!     println!("{}", uat.connection_info.dsn());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod output;
pub mod rpc;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::{EnvironmentClient, TOOL_LIST_ENVIRONMENTS};
pub use config::{resolve_config, ClientConfig, PartialConfig};
pub use environment::{
    ConnectionInfo, EnvironmentDescriptor, EnvironmentListing, EnvironmentStatus, PoolConfig,
};
pub use error::{EnvctlError, Result};
pub use output::{ErrorInfo, Metadata, Report};
pub use rpc::{RpcRequest, RpcResponse, ToolCallParams, ToolDescriptor};
pub use transport::{HttpTransport, Transport, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
