//! MCP server over stdio.
//!
//! Reads newline-delimited JSON-RPC 2.0 requests from stdin and writes
//! responses to stdout. One request is handled at a time; notifications
//! (requests without an id) are consumed without a reply. All logging goes to
//! stderr so stdout stays a clean protocol channel.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::resources::{ResourceDescriptor, ResourceRouter, RouteResult};
use crate::session::McpSession;
use crate::tools::ToolRegistry;

/// Protocol revision advertised in the initialize response.
const PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC error code for a resource that cannot be found (per MCP).
const CODE_RESOURCE_NOT_FOUND_RPC: i64 = -32002;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol marker, always "2.0".
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    /// Request id; absent for notifications.
    pub id: Option<JsonValue>,
    /// Method name, e.g. "tools/call".
    pub method: String,
    /// Method parameters.
    pub params: Option<JsonValue>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol marker, always "2.0".
    pub jsonrpc: &'static str,
    /// Echoed request id.
    pub id: Option<JsonValue>,
    /// Result payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error object on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<JsonValue>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

/// The MCP server: session, tool registry, and resource router.
pub struct McpServer {
    session: McpSession,
    tools: ToolRegistry,
    router: ResourceRouter,
}

impl McpServer {
    /// Create a server from its three parts.
    pub fn new(session: McpSession, tools: ToolRegistry, router: ResourceRouter) -> Self {
        Self {
            session,
            tools,
            router,
        }
    }

    /// Run the stdio loop until stdin closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();
        info!(
            tool_count = self.tools.tools().len(),
            cloud = self.session.has_cloud(),
            "MCP server ready"
        );

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    let response =
                        JsonRpcResponse::err(None, -32700, format!("Parse error: {e}"));
                    write_response(&mut stdout, &response).await?;
                    continue;
                }
            };

            // Notifications must not receive responses.
            if request.id.is_none() {
                debug!(method = %request.method, "notification");
                continue;
            }

            let response = self.handle_request(request).await;
            write_response(&mut stdout, &response).await?;
        }
        Ok(())
    }

    /// Handle one request. Total: every request gets a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        debug!(method = %request.method, "request");
        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.tools() })),
            "tools/call" => return self.call_tool(id, request.params).await,
            "resources/list" => self.resources_list(request.params).await,
            "resources/read" => self.resources_read(request.params).await,
            "resources/templates/list" => Ok(json!({
                "resourceTemplates": self.router.route_templates()
            })),
            other => Err(JsonRpcError {
                code: -32601,
                message: format!("Method not found: {other}"),
            }),
        };

        match result {
            Ok(result) => JsonRpcResponse::ok(id, result),
            Err(e) => JsonRpcResponse::err(id, e.code, e.message),
        }
    }

    fn initialize(&self) -> JsonValue {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {},
                "resources": {}
            }
        })
    }

    async fn call_tool(&self, id: Option<JsonValue>, params: Option<JsonValue>) -> JsonRpcResponse {
        let params = params.unwrap_or_default();
        let name = match params.get("name").and_then(|n| n.as_str()) {
            Some(name) => name.to_string(),
            None => {
                return JsonRpcResponse::err(id, -32602, "missing tool name".to_string());
            }
        };
        let args: Map<String, JsonValue> = params
            .get("arguments")
            .and_then(|a| a.as_object())
            .cloned()
            .unwrap_or_default();

        match self.tools.dispatch(&self.session, &name, args).await {
            Ok(markdown) => JsonRpcResponse::ok(id, tool_content(&markdown, false)),
            // Per MCP, execution failures are successful responses flagged
            // isError; only protocol-shape errors stay JSON-RPC errors.
            Err(e) if e.json_rpc_code() == -32603 => {
                warn!(tool = %name, error = %e, "tool call failed");
                JsonRpcResponse::ok(id, tool_content(&e.to_string(), true))
            }
            Err(e) => JsonRpcResponse::err(id, e.json_rpc_code(), e.to_string()),
        }
    }

    async fn resources_list(
        &self,
        params: Option<JsonValue>,
    ) -> std::result::Result<JsonValue, JsonRpcError> {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|u| u.as_str());
        let result = match uri {
            // Without a URI, list the namespace roots without remote calls.
            None => return Ok(json!({ "resources": self.router.root_resources() })),
            Some(uri) => self.router.route_list(&self.session, uri).await,
        };
        match result {
            RouteResult::Resources(items) => Ok(json!({ "resources": items })),
            RouteResult::Resource(contents) => {
                // A leaf URI listed rather than read: one-element listing.
                let item = ResourceDescriptor::markdown(contents.uri, "resource", None);
                Ok(json!({ "resources": [item] }))
            }
            RouteResult::Error { code, message } => Err(route_error(&code, message)),
        }
    }

    async fn resources_read(
        &self,
        params: Option<JsonValue>,
    ) -> std::result::Result<JsonValue, JsonRpcError> {
        let Some(uri) = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|u| u.as_str())
        else {
            return Err(JsonRpcError {
                code: -32602,
                message: "missing resource uri".to_string(),
            });
        };

        match self.router.route_read(&self.session, uri).await {
            RouteResult::Resource(contents) => Ok(json!({ "contents": [contents] })),
            RouteResult::Resources(items) => {
                // A container URI read rather than listed: render the listing
                // as markdown so the read stays useful.
                let mut text = String::new();
                for item in &items {
                    text.push_str(&format!(
                        "- [{}]({}) {}\n",
                        item.name,
                        item.uri,
                        item.description.as_deref().unwrap_or_default()
                    ));
                }
                Ok(json!({
                    "contents": [{ "uri": uri, "mimeType": "text/markdown", "text": text }]
                }))
            }
            RouteResult::Error { code, message } => Err(route_error(&code, message)),
        }
    }
}

fn route_error(code: &str, message: String) -> JsonRpcError {
    let rpc_code = if code == crate::resources::CODE_RESOURCE_NOT_FOUND {
        CODE_RESOURCE_NOT_FOUND_RPC
    } else {
        -32603
    };
    JsonRpcError {
        code: rpc_code,
        message,
    }
}

fn tool_content(text: &str, is_error: bool) -> JsonValue {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}

async fn write_response(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut output = serde_json::to_string(response)?;
    output.push('\n');
    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
