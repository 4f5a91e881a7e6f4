//! JSON-RPC Transport
//!
//! This module defines the [`Transport`] trait and its HTTP implementation.
//!
//! # Blocking Design
//! Every call issues exactly one HTTP POST and blocks until the full response
//! arrives or the configured timeout elapses. There is no retry, no batching,
//! and no cancellation.
//!
//! # Request Ids
//! Ids start at 1 and increase by one per call. The counter is atomic, so a
//! transport can be shared across threads, but each caller still has at most
//! one request in flight.
//!
//! # Failure Kinds
//! - Connection could not be established → [`EnvctlError::ConnectionFailed`]
//! - Non-2xx status, timeout, unreadable or malformed body → [`EnvctlError::TransportFailed`]
//! - Well-formed envelope with an `error` member → [`EnvctlError::Protocol`]

use serde_json::Value;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{EnvctlError, Result};
use crate::rpc::{RpcRequest, RpcResponse, ToolCallParams, METHOD_TOOLS_CALL};

/// Default MCP endpoint of a locally running server
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/mcp";

/// Default upper bound for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest slice of an error body echoed back in a transport error
const MAX_ERROR_BODY: usize = 256;

/// A synchronous JSON-RPC method invoker
///
/// Implementations return the untyped `result` member on success.
pub trait Transport {
    /// Invoke `method` with `params` and return the `result` member
    fn call(&self, method: &str, params: Value) -> Result<Value>;

    /// Invoke an MCP tool through `tools/call`
    fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let params = serde_json::to_value(ToolCallParams::new(name, arguments))
            .map_err(|e| EnvctlError::transport(format!("Could not encode tool call: {e}")))?;
        self.call(METHOD_TOOLS_CALL, params)
    }
}

/// JSON-RPC over synchronous HTTP POST
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
    timeout: Duration,
    last_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with [`DEFAULT_TIMEOUT`]
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a transport for `endpoint` with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(EnvctlError::config_error("Endpoint URL must not be empty"));
        }

        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| EnvctlError::transport(format!("Could not create HTTP client: {e}")))?;

        Ok(Self { client, endpoint, timeout, last_id: AtomicU64::new(0) })
    }

    /// Endpoint URL requests are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Id of the most recently issued request (0 before the first call)
    #[must_use]
    pub fn last_request_id(&self) -> u64 {
        self.last_id.load(Ordering::SeqCst)
    }

    /// Reserve the next request id
    fn next_request_id(&self) -> u64 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Post a prepared request and parse the response envelope
    ///
    /// Does not interpret the envelope; [`Transport::call`] turns an `error`
    /// member into [`EnvctlError::Protocol`].
    pub fn send(&self, request: &RpcRequest) -> Result<RpcResponse> {
        debug!(
            method = %request.method,
            id = request.id,
            endpoint = %self.endpoint,
            "sending JSON-RPC request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EnvctlError::http_status(
                status.as_u16(),
                format!("HTTP {status}: {}", truncate(&body, MAX_ERROR_BODY)),
            ));
        }

        let body = response.bytes().map_err(|e| self.classify(e))?;
        let envelope: RpcResponse = serde_json::from_slice(&body)
            .map_err(|e| EnvctlError::transport(format!("Malformed JSON-RPC response: {e}")))?;

        match envelope.id() {
            Some(Value::Number(n)) if n.as_u64() == Some(request.id) => {}
            None | Some(Value::Null) => {}
            Some(other) => {
                warn!(
                    expected = request.id,
                    received = %other,
                    "response id does not match request id"
                );
            }
        }

        Ok(envelope)
    }

    /// Map a reqwest failure onto the error taxonomy
    fn classify(&self, err: reqwest::Error) -> EnvctlError {
        if err.is_connect() {
            EnvctlError::connection_failed(&self.endpoint, err.to_string())
        } else if err.is_timeout() {
            EnvctlError::transport(format!("Request timed out after {}ms", self.timeout.as_millis()))
        } else {
            EnvctlError::transport(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        if method.trim().is_empty() {
            return Err(EnvctlError::transport("JSON-RPC method name must not be empty"));
        }
        let request = RpcRequest::new(self.next_request_id(), method, params);

        match self.send(&request)?.into_result() {
            Ok(result) => Ok(result),
            Err(error) => {
                debug!(method, id = request.id, "server returned JSON-RPC error");
                Err(EnvctlError::protocol(error))
            }
        }
    }
}

/// Whether `endpoint` points at this machine; such requests bypass any system proxy
fn is_loopback(endpoint: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(endpoint) else {
        return false;
    };
    url.host_str().is_some_and(|host| {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        host.eq_ignore_ascii_case("localhost")
            || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
    })
}

/// Cut `text` to at most `max` bytes on a char boundary
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
