//! Tool registry and dispatch.
//!
//! Exposes the registry tools (provider docs, modules, policies) always, and
//! the HCP Terraform tools (organizations, workspaces) only when a token was
//! configured. Every tool validates its JSON arguments, issues registry HTTP
//! calls, and returns rendered markdown.

pub(crate) mod modules;
pub(crate) mod policies;
pub(crate) mod providers;
pub(crate) mod workspaces;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::session::McpSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "search_providers")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create the registry with the public registry tools only.
    pub fn new() -> Self {
        let mut tools = Vec::new();
        tools.extend(providers::tools());
        tools.extend(modules::tools());
        tools.extend(policies::tools());
        Self { tools }
    }

    /// Create the registry with the HCP Terraform tools included.
    pub fn with_cloud() -> Self {
        let mut registry = Self::new();
        registry.tools.extend(workspaces::tools());
        registry
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler, returning markdown.
    pub async fn dispatch(
        &self,
        session: &McpSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<String> {
        // Cloud tools exist as code even when not registered; gate on the
        // advertised surface so an unconfigured server rejects them uniformly.
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(McpError::UnknownTool(name.to_string()));
        }

        match name {
            "search_providers" | "get_provider_details" | "get_latest_provider_version" => {
                providers::dispatch(session, name, args).await
            }
            "search_modules" | "get_module_details" => {
                modules::dispatch(session, name, args).await
            }
            "search_policies" | "get_policy_details" => {
                policies::dispatch(session, name, args).await
            }
            "list_organizations" | "list_workspaces" | "get_workspace_details" => {
                workspaces::dispatch(session, name, args).await
            }
            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut props = serde_json::Map::new();
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": []
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type any) => { serde_json::json!({}) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RegistryClient;

    #[test]
    fn registry_surface_excludes_cloud_tools_by_default() {
        let registry = ToolRegistry::new();
        assert!(registry.tools().iter().any(|t| t.name == "search_providers"));
        assert!(!registry.tools().iter().any(|t| t.name == "list_workspaces"));

        let with_cloud = ToolRegistry::with_cloud();
        assert!(with_cloud.tools().iter().any(|t| t.name == "list_workspaces"));
    }

    #[test]
    fn tool_names_are_unique() {
        let registry = ToolRegistry::with_cloud();
        let mut names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let registry = ToolRegistry::new();
        let session = McpSession::new(RegistryClient::new("http://127.0.0.1:1"));
        let err = registry
            .dispatch(&session, "no_such_tool", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn unregistered_cloud_tool_is_rejected() {
        let registry = ToolRegistry::new();
        let session = McpSession::new(RegistryClient::new("http://127.0.0.1:1"));
        let err = registry
            .dispatch(&session, "list_workspaces", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::UnknownTool(_)));
    }

    #[test]
    fn schemas_declare_required_arguments() {
        let registry = ToolRegistry::with_cloud();
        let details = registry
            .tools()
            .iter()
            .find(|t| t.name == "get_provider_details")
            .map(|t| t.input_schema.clone())
            .unwrap_or_default();
        let required: Vec<&str> = details["required"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(required, vec!["provider_doc_id"]);
    }
}
