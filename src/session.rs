//! MCP session state.
//!
//! Holds the HTTP clients the tools and resource handlers operate against:
//! the public registry client is always present, the HCP Terraform client only
//! when a token was configured at startup.

use crate::client::{CloudClient, RegistryClient};
use crate::error::{McpError, Result};

/// Per-process session handed to every tool call and resource handler.
pub struct McpSession {
    registry: RegistryClient,
    cloud: Option<CloudClient>,
}

impl McpSession {
    /// Create a session with only the public registry configured.
    pub fn new(registry: RegistryClient) -> Self {
        Self {
            registry,
            cloud: None,
        }
    }

    /// Create a session with both the registry and HCP Terraform configured.
    pub fn with_cloud(registry: RegistryClient, cloud: CloudClient) -> Self {
        Self {
            registry,
            cloud: Some(cloud),
        }
    }

    /// The public registry client.
    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Whether an HCP Terraform token was configured.
    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    /// The HCP Terraform client.
    ///
    /// Cloud tools and resources are only registered when a token exists, so
    /// this failing indicates a registration bug rather than user error, but
    /// it is still surfaced as a structured error.
    pub fn cloud(&self) -> Result<&CloudClient> {
        self.cloud.as_ref().ok_or(McpError::CloudNotConfigured)
    }
}
