//! HTTP clients for the public Terraform registry and the HCP Terraform API.
//!
//! Both clients are thin wrappers over a shared [`reqwest::Client`]: build the
//! URL, issue a GET, map non-success statuses to [`McpError::Registry`], and
//! deserialize the JSON body. All response shaping into markdown happens in
//! the tool and resource layers.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{McpError, Result};

/// Default public registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.terraform.io";

/// Default HCP Terraform endpoint.
pub const DEFAULT_TFC_ADDRESS: &str = "https://app.terraform.io";

/// Client for the public Terraform registry (`registry.terraform.io`).
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against the given base URL (no trailing slash).
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET a registry path (e.g. `/v1/providers/hashicorp/aws`) with optional
    /// query parameters and return the JSON body.
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "registry GET");
        let response = self.http.get(&url).query(query).send().await?;
        read_json(response).await
    }
}

/// Client for the HCP Terraform (Terraform Cloud/Enterprise) v2 API.
///
/// Only constructed when a token is configured; cloud tools and resources are
/// not registered without one.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    address: String,
}

impl CloudClient {
    /// Create a client against `address` authenticating with `token`.
    pub fn new(address: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| McpError::InvalidArg {
                name: "tfc-token".to_string(),
                reason: "token contains non-header characters".to_string(),
            })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.api+json"));
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            address: address.trim_end_matches('/').to_string(),
        })
    }

    /// GET an API path (e.g. `/api/v2/organizations`) and return the JSON body.
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue> {
        let url = format!("{}{}", self.address, path);
        debug!(%url, "cloud GET");
        let response = self.http.get(&url).query(query).send().await?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<JsonValue> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        return Err(McpError::Registry {
            status: status.as_u16(),
            message: truncate_body(&message),
        });
    }
    Ok(response.json().await?)
}

/// Error bodies can be large HTML pages; keep diagnostics short.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}
