//! # terraform-mcp
//!
//! MCP (Model Context Protocol) server for the Terraform registry and HCP
//! Terraform. It implements the MCP protocol over stdin/stdout using
//! JSON-RPC 2.0.
//!
//! ## Tools
//!
//! Public registry (always available): `search_providers`,
//! `get_provider_details`, `get_latest_provider_version`, `search_modules`,
//! `get_module_details`, `search_policies`, `get_policy_details`.
//!
//! HCP Terraform (when a token is configured): `list_organizations`,
//! `list_workspaces`, `get_workspace_details`.
//!
//! ## Resources
//!
//! Resources are addressed by URIs such as
//! `registry://providers/{namespace}/{provider}` and
//! `terraform://organizations/{org}/workspaces/{workspace}`, routed through
//! an ordered pattern table where the first structural match wins.
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools
//! like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "terraform": {
//!       "command": "/path/to/terraform-mcp",
//!       "args": ["--tfc-token", "..."]
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, the server parts can be assembled directly:
//!
//! ```no_run
//! use terraform_mcp::{
//!     build_route_table, registry_routes, McpServer, McpSession, RegistryClient, ToolRegistry,
//! };
//!
//! let session = McpSession::new(RegistryClient::new("https://registry.terraform.io"));
//! let router = build_route_table(vec![registry_routes()]).expect("static route table");
//! let server = McpServer::new(session, ToolRegistry::new(), router);
//! // server.run().await reads from stdin and writes to stdout.
//! ```

#![warn(missing_docs)]

mod client;
mod convert;
mod error;
mod markdown;
mod resources;
mod server;
mod session;
mod tools;
mod uri;

pub use client::{CloudClient, RegistryClient, DEFAULT_REGISTRY_URL, DEFAULT_TFC_ADDRESS};
pub use error::{McpError, Result};
pub use resources::cloud::routes as cloud_routes;
pub use resources::registry::routes as registry_routes;
pub use resources::{
    build_route_table, Handler, HandlerFuture, RequestKind, ResourceContents, ResourceDescriptor,
    ResourceRouter, RouteEntry, RouteRequest, RouteResult, RouteTemplate,
};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use tools::{ToolDef, ToolRegistry};
pub use uri::{extract_params, matches, ResourceUri, UriPattern};
