//! JSON-RPC 2.0 Envelope Types
//!
//! Typed request and response envelopes for talking to an MCP server over HTTP.
//!
//! # Wire Format
//! - Request: `{"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {...}}`
//! - Success: `{"jsonrpc": "2.0", "id": 1, "result": {...}}`
//! - Error: `{"jsonrpc": "2.0", "id": 1, "error": {"code": -32603, "message": "..."}}`
//!
//! When a response carries both `result` and `error`, the error wins.
//! A response carrying neither is rejected at parse time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Protocol version sent in every request
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP method used to invoke a server-side tool
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// MCP method used to enumerate server-side tools
pub const METHOD_TOOLS_LIST: &str = "tools/list";

// ============================================================================
// Requests
// ============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    /// Create a request; `Value::Null` params are sent as an empty object
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        let params = if params.is_null() { Value::Object(serde_json::Map::new()) } else { params };

        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, method: method.into(), params }
    }
}

/// Parameters of an MCP `tools/call` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool name (e.g. `list_environments`)
    pub name: String,

    /// Tool-specific argument bundle
    pub arguments: Value,
}

impl ToolCallParams {
    /// Create tool call parameters; `Value::Null` arguments become `{}`
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments =
            if arguments.is_null() { Value::Object(serde_json::Map::new()) } else { arguments };

        Self { name: name.into(), arguments }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// JSON-RPC 2.0 Response
///
/// Parsing goes through [`RawResponse`] so that `"result": null` still counts
/// as a present result and a body with neither member fails immediately.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawResponse")]
pub enum RpcResponse {
    /// Server returned a `result` member
    Success { id: Option<Value>, result: Value },

    /// Server returned an `error` member
    Error { id: Option<Value>, error: Value },
}

impl RpcResponse {
    /// The id echoed by the server, if any
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id.as_ref(),
        }
    }

    /// Extract result or return the raw error payload
    pub fn into_result(self) -> std::result::Result<Value, Value> {
        match self {
            Self::Success { result, .. } => Ok(result),
            Self::Error { error, .. } => Err(error),
        }
    }
}

/// Wire shape of a response before the success/error split
#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    error: Option<Value>,
}

/// Distinguishes a member set to `null` from an absent one
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawResponse> for RpcResponse {
    type Error = String;

    fn try_from(raw: RawResponse) -> std::result::Result<Self, String> {
        match (raw.error, raw.result) {
            (Some(error), _) if !error.is_null() => Ok(RpcResponse::Error { id: raw.id, error }),
            (_, Some(result)) => Ok(RpcResponse::Success { id: raw.id, result }),
            _ => Err("response carries neither `result` nor `error`".to_string()),
        }
    }
}

// ============================================================================
// MCP tool discovery
// ============================================================================

/// One entry of a `tools/list` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON schema of the tool's `arguments`
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// `tools/list` result
#[derive(Debug, Clone, Deserialize)]
pub struct ToolList {
    pub tools: Vec<ToolDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = RpcRequest::new(
            7,
            METHOD_TOOLS_CALL,
            serde_json::to_value(ToolCallParams::new(
                "list_environments",
                json!({"include_disabled": true}),
            ))
            .unwrap(),
        );

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {
                    "name": "list_environments",
                    "arguments": {"include_disabled": true}
                }
            })
        );
    }

    #[test]
    fn test_null_params_become_empty_object() {
        let req = RpcRequest::new(1, METHOD_TOOLS_LIST, Value::Null);
        assert_eq!(req.params, json!({}));

        let params = ToolCallParams::new("list_environments", Value::Null);
        assert_eq!(params.arguments, json!({}));
    }

    #[test]
    fn test_success_response_parsing() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{"status":"ok"}}"#).unwrap();
        assert_eq!(resp.id(), Some(&json!(1)));
        let result = resp.into_result().unwrap();
        assert_eq!(result["status"], "ok");
    }

    #[test]
    fn test_null_result_is_still_success() {
        let resp: RpcResponse = serde_json::from_str(r#"{"id":1,"result":null}"#).unwrap();
        assert_eq!(resp.into_result(), Ok(Value::Null));
    }

    #[test]
    fn test_error_takes_precedence() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"result":{"a":1},"error":{"message":"boom"}}"#).unwrap();
        assert_eq!(resp.into_result(), Err(json!({"message": "boom"})));
    }

    #[test]
    fn test_null_error_is_ignored() {
        let resp: RpcResponse = serde_json::from_str(r#"{"result":[],"error":null}"#).unwrap();
        assert_eq!(resp.into_result(), Ok(json!([])));
    }

    #[test]
    fn test_missing_result_and_error_rejected() {
        let err = serde_json::from_str::<RpcResponse>(r#"{"jsonrpc":"2.0","id":3}"#).unwrap_err();
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn test_tool_descriptor_parsing() {
        let list: ToolList = serde_json::from_value(json!({
            "tools": [
                {
                    "name": "list_environments",
                    "description": "List all configured database environments",
                    "inputSchema": {"type": "object"}
                },
                {"name": "health_check_env"}
            ]
        }))
        .unwrap();

        assert_eq!(list.tools.len(), 2);
        assert_eq!(list.tools[0].input_schema, json!({"type": "object"}));
        assert!(list.tools[1].description.is_none());
        assert!(list.tools[1].input_schema.is_null());
    }
}
