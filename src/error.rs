//! Error types for the MCP server.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors produced by the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// A resource URI or pattern does not have the `scheme://path` shape.
    #[error("malformed URI: {0}")]
    MalformedUri(String),

    /// A tool call named a tool that is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A required tool argument was not supplied.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// A tool argument was supplied but has the wrong shape.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name as it appears in the tool schema.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The remote API answered with a non-success status.
    #[error("registry API error ({status}): {message}")]
    Registry {
        /// HTTP status code returned by the remote API.
        status: u16,
        /// Response body or status text for diagnostics.
        message: String,
    },

    /// A cloud tool or resource was invoked without a configured token.
    #[error("HCP Terraform is not configured: set a token via --tfc-token or TFE_TOKEN")]
    CloudNotConfigured,

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stdio transport failure in the server run loop.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation.
    #[error("{0}")]
    Internal(String),
}

impl McpError {
    /// JSON-RPC error code for this error when it must surface as a protocol
    /// error rather than tool content.
    pub fn json_rpc_code(&self) -> i64 {
        match self {
            McpError::UnknownTool(_) => -32601,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } | McpError::MalformedUri(_) => {
                -32602
            }
            _ => -32603,
        }
    }
}
