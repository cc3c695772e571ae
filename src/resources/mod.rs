//! Resource routing.
//!
//! Inbound `resources/list` and `resources/read` requests carry a URI. The
//! [`ResourceRouter`] scans an ordered table of compiled patterns, and the
//! first structural match wins; the entry's handler is invoked once with the
//! URI and the extracted parameters. The router is total: an unmatched or
//! malformed URI and a failing handler both come back as tagged
//! [`RouteResult::Error`] values, never as a raised error.
//!
//! The table is built once at startup by [`build_route_table`] from the two
//! static sub-tables ([`registry::routes`] and [`cloud::routes`]) and is
//! read-only afterwards.

pub mod cloud;
pub mod registry;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::McpSession;
use crate::uri::{ResourceUri, UriPattern};

/// Error code for a URI no table entry matches.
pub const CODE_RESOURCE_NOT_FOUND: &str = "resource_not_found";

/// Error code for a matched handler that failed.
pub const CODE_HANDLER_FAILED: &str = "handler_failed";

/// Kind of inbound resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `resources/list` — enumerate resources under a container URI.
    List,
    /// `resources/read` — read one resource's contents.
    Read,
}

/// A resource descriptor, the unit of `resources/list` payloads.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Resource URI, addressable via `resources/read`.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Optional one-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the readable contents.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl ResourceDescriptor {
    /// Markdown resource descriptor.
    pub fn markdown(uri: impl Into<String>, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description,
            mime_type: "text/markdown".to_string(),
        }
    }
}

/// Contents of one readable resource, the unit of `resources/read` payloads.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceContents {
    /// The URI the contents were read from.
    pub uri: String,
    /// MIME type of `text`.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// The rendered markdown.
    pub text: String,
}

impl ResourceContents {
    /// Markdown contents for `uri`.
    pub fn markdown(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: "text/markdown".to_string(),
            text: text.into(),
        }
    }
}

/// Tagged outcome of routing a resource request.
#[derive(Debug)]
pub enum RouteResult {
    /// List-style payload.
    Resources(Vec<ResourceDescriptor>),
    /// Read-style payload.
    Resource(ResourceContents),
    /// Structured failure (not found, handler failure).
    Error {
        /// Stable machine-readable code.
        code: String,
        /// Human-readable diagnostics.
        message: String,
    },
}

impl RouteResult {
    fn not_found(uri: &str) -> Self {
        RouteResult::Error {
            code: CODE_RESOURCE_NOT_FOUND.to_string(),
            message: format!("no resource matches URI: {uri}"),
        }
    }
}

/// Inbound request handed to a route handler.
#[derive(Debug)]
pub struct RouteRequest {
    /// Whether this is a list or read request.
    pub kind: RequestKind,
    /// The original URI string.
    pub uri: String,
    /// `{name}` placeholder captures from the matched pattern.
    pub params: HashMap<String, String>,
}

impl RouteRequest {
    /// A required path parameter. The pattern guarantees the capture exists,
    /// so a miss is an internal routing bug.
    pub fn param(&self, name: &str) -> Result<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| crate::error::McpError::Internal(format!("missing route param: {name}")))
    }
}

/// Future returned by a route handler.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<RouteResult>> + Send + 'a>>;

/// A route handler: an async function of (session, request).
pub type Handler = for<'a> fn(&'a McpSession, RouteRequest) -> HandlerFuture<'a>;

/// A static route table entry, as declared in the sub-tables.
pub struct RouteEntry {
    /// Pattern string, e.g. `registry://providers/{namespace}/{provider}`.
    pub pattern: &'static str,
    /// Display name for template listings.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Handler invoked on match.
    pub handler: Handler,
}

struct CompiledRoute {
    pattern: UriPattern,
    name: &'static str,
    description: &'static str,
    handler: Handler,
}

/// The immutable, ordered resource route table.
pub struct ResourceRouter {
    routes: Vec<CompiledRoute>,
}

/// A registered URI template, the unit of `resources/templates/list` payloads.
#[derive(Debug, Clone, Serialize)]
pub struct RouteTemplate {
    /// Pattern string with `{name}` placeholders.
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
}

/// Build the route table from ordered sub-tables.
///
/// Sub-table order is preserved and significant: requests are matched
/// front-to-back and the first structural match wins. Fails only if a declared
/// pattern string is not URI-shaped, which is a programming error caught at
/// startup.
pub fn build_route_table(sub_tables: Vec<Vec<RouteEntry>>) -> Result<ResourceRouter> {
    let mut routes = Vec::new();
    for entry in sub_tables.into_iter().flatten() {
        routes.push(CompiledRoute {
            pattern: UriPattern::compile(entry.pattern)?,
            name: entry.name,
            description: entry.description,
            handler: entry.handler,
        });
    }
    debug!(route_count = routes.len(), "resource route table built");
    Ok(ResourceRouter { routes })
}

impl ResourceRouter {
    /// Route a `resources/list` request.
    pub async fn route_list(&self, session: &McpSession, uri: &str) -> RouteResult {
        self.route(session, RequestKind::List, uri).await
    }

    /// Route a `resources/read` request.
    pub async fn route_read(&self, session: &McpSession, uri: &str) -> RouteResult {
        self.route(session, RequestKind::Read, uri).await
    }

    /// All registered patterns, for `resources/templates/list`.
    pub fn route_templates(&self) -> Vec<RouteTemplate> {
        self.routes
            .iter()
            .map(|r| RouteTemplate {
                uri_template: r.pattern.source().to_string(),
                name: r.name.to_string(),
                description: r.description.to_string(),
            })
            .collect()
    }

    /// Descriptors for the parameterless entry points, used when a list
    /// request names no URI.
    pub fn root_resources(&self) -> Vec<ResourceDescriptor> {
        self.routes
            .iter()
            .filter(|r| !r.pattern.source().contains('{'))
            .map(|r| {
                ResourceDescriptor::markdown(
                    r.pattern.source(),
                    r.name,
                    Some(r.description.to_string()),
                )
            })
            .collect()
    }

    async fn route(&self, session: &McpSession, kind: RequestKind, uri: &str) -> RouteResult {
        let parsed = match ResourceUri::parse(uri) {
            Ok(parsed) => parsed,
            Err(_) => {
                // Malformed URIs are "not found", not protocol faults.
                warn!(%uri, "malformed resource URI");
                return RouteResult::not_found(uri);
            }
        };

        for route in &self.routes {
            let Some(params) = route.pattern.match_uri(&parsed) else {
                continue;
            };
            debug!(%uri, pattern = route.pattern.source(), "resource route matched");
            let request = RouteRequest {
                kind,
                uri: uri.to_string(),
                params,
            };
            return match (route.handler)(session, request).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(%uri, pattern = route.pattern.source(), error = %e, "resource handler failed");
                    RouteResult::Error {
                        code: CODE_HANDLER_FAILED.to_string(),
                        message: e.to_string(),
                    }
                }
            };
        }

        warn!(%uri, "no resource route matched");
        RouteResult::not_found(uri)
    }
}
