//! Provider documentation tools.
//!
//! Tools: search_providers, get_provider_details, get_latest_provider_version
//!
//! Provider docs live behind the registry's v2 API: a provider has versions,
//! each version has docs, and a doc has markdown content. `search_providers`
//! resolves doc IDs for a service slug; `get_provider_details` fetches one
//! doc's markdown body.

use serde_json::{Map, Value as JsonValue};

use crate::convert::{get_optional_string, get_string_arg, str_field, u64_field};
use crate::error::{McpError, Result};
use crate::markdown;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;

/// Namespace assumed when the caller does not give one.
const DEFAULT_NAMESPACE: &str = "hashicorp";

/// Doc categories accepted by `provider_data_type`.
const DATA_TYPES: &[&str] = &["resources", "data-sources", "functions", "guides", "overview"];

/// Get all provider tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_providers",
            "Find provider documentation IDs for a service. Given a provider name (e.g. 'aws') \
             and a service slug (e.g. 's3_bucket'), returns the matching documentation entries \
             with their IDs. Pass a provider_data_type of 'resources' (default), 'data-sources', \
             'functions', 'guides', or 'overview' to pick the doc category, and provider_version \
             to pin a version (defaults to latest). Use get_provider_details with a returned ID \
             to read the full document.",
            schema!(object {
                required: { "provider_name": string, "service_slug": string },
                optional: {
                    "provider_namespace": string,
                    "provider_data_type": string,
                    "provider_version": string
                }
            }),
        ),
        ToolDef::new(
            "get_provider_details",
            "Fetch one provider documentation page by ID (as returned by search_providers) and \
             return its markdown content.",
            schema!(object {
                required: { "provider_doc_id": string }
            }),
        ),
        ToolDef::new(
            "get_latest_provider_version",
            "Get the latest published version of a provider. Namespace defaults to 'hashicorp'.",
            schema!(object {
                required: { "name": string },
                optional: { "namespace": string }
            }),
        ),
    ]
}

/// Dispatch a provider tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "search_providers" => search_providers(session, &args).await,
        "get_provider_details" => get_provider_details(session, &args).await,
        "get_latest_provider_version" => get_latest_provider_version(session, &args).await,
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn search_providers(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let provider_name = get_string_arg(args, "provider_name")?;
    let service_slug = get_string_arg(args, "service_slug")?;
    let namespace =
        get_optional_string(args, "provider_namespace").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let data_type =
        get_optional_string(args, "provider_data_type").unwrap_or_else(|| "resources".to_string());
    if !DATA_TYPES.contains(&data_type.as_str()) {
        return Err(McpError::InvalidArg {
            name: "provider_data_type".to_string(),
            reason: format!("expected one of {}", DATA_TYPES.join(", ")),
        });
    }
    let wanted_version = get_optional_string(args, "provider_version");

    let version_id =
        resolve_version_id(session, &namespace, &provider_name, wanted_version.as_deref()).await?;

    let docs = session
        .registry()
        .get_json(
            "/v2/provider-docs",
            &[
                ("filter[provider-version]", version_id.as_str()),
                ("filter[category]", data_type.as_str()),
                ("filter[language]", "hcl"),
                ("page[size]", "100"),
            ],
        )
        .await?;

    // The registry ignores unknown slugs rather than filtering on them, so
    // match locally against slug and title.
    let needle = service_slug.to_lowercase();
    let empty = Vec::new();
    let matches: Vec<&JsonValue> = docs
        .get("data")
        .and_then(|d| d.as_array())
        .unwrap_or(&empty)
        .iter()
        .filter(|doc| {
            let field = |key: &str| {
                doc.pointer(&format!("/attributes/{key}"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_lowercase()
            };
            field("slug").contains(&needle) || field("title").contains(&needle)
        })
        .collect();

    if matches.is_empty() {
        return Ok(format!(
            "No {data_type} documentation found for '{service_slug}' in provider \
             {namespace}/{provider_name}. Try a different service_slug or provider_data_type."
        ));
    }

    let mut text = format!(
        "# Documentation for {namespace}/{provider_name}: '{service_slug}' ({data_type})\n\n\
         Call get_provider_details with a provider_doc_id to read a document.\n\n"
    );
    for doc in matches {
        let attrs = doc.get("attributes").cloned().unwrap_or(JsonValue::Null);
        text.push_str(&format!(
            "- **{}** (id: `{}`, category: {})\n",
            str_field(&attrs, "title"),
            str_field(doc, "id"),
            str_field(&attrs, "category"),
        ));
    }
    Ok(text)
}

/// Resolve the v2 provider-version ID for the requested (or latest) version.
async fn resolve_version_id(
    session: &McpSession,
    namespace: &str,
    name: &str,
    wanted: Option<&str>,
) -> Result<String> {
    let body = session
        .registry()
        .get_json(
            &format!(
                "/v2/providers/{}/{}",
                urlencoding::encode(namespace),
                urlencoding::encode(name)
            ),
            &[("include", "provider-versions")],
        )
        .await?;

    let empty = Vec::new();
    let versions = body
        .get("included")
        .and_then(|i| i.as_array())
        .unwrap_or(&empty);

    let chosen = match wanted {
        Some(wanted) => versions.iter().find(|v| {
            v.get("attributes")
                .map(|a| str_field(a, "version") == wanted)
                .unwrap_or(false)
        }),
        // Versions are returned oldest-first; the latest is the last entry.
        None => versions.last(),
    };

    chosen
        .map(|v| str_field(v, "id").to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| McpError::Registry {
            status: 404,
            message: match wanted {
                Some(wanted) => {
                    format!("version {wanted} of provider {namespace}/{name} not found")
                }
                None => format!("no published versions for provider {namespace}/{name}"),
            },
        })
}

async fn get_provider_details(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let doc_id = get_string_arg(args, "provider_doc_id")?;
    let body = session
        .registry()
        .get_json(
            &format!("/v2/provider-docs/{}", urlencoding::encode(&doc_id)),
            &[],
        )
        .await?;

    let attrs = body
        .get("data")
        .and_then(|d| d.get("attributes"))
        .cloned()
        .unwrap_or(JsonValue::Null);
    let content = str_field(&attrs, "content");
    if content.is_empty() {
        return Err(McpError::Registry {
            status: 404,
            message: format!("provider doc {doc_id} has no content"),
        });
    }

    let title = markdown::frontmatter_field(content, "page_title")
        .unwrap_or_else(|| str_field(&attrs, "title").to_string());
    let mut text = format!("# {title}\n\n");
    if let Some(subcategory) = markdown::frontmatter_field(content, "subcategory") {
        text.push_str(&format!("*Subcategory: {subcategory}*\n\n"));
    }
    text.push_str(markdown::strip_frontmatter(content).trim_start());
    Ok(text)
}

async fn get_latest_provider_version(
    session: &McpSession,
    args: &Map<String, JsonValue>,
) -> Result<String> {
    let name = get_string_arg(args, "name")?;
    let namespace =
        get_optional_string(args, "namespace").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let body = session
        .registry()
        .get_json(
            &format!(
                "/v1/providers/{}/{}",
                urlencoding::encode(&namespace),
                urlencoding::encode(&name)
            ),
            &[],
        )
        .await?;

    Ok(format!(
        "Provider {namespace}/{name}: latest version **{}** (published {}, {} downloads)",
        str_field(&body, "version"),
        str_field(&body, "published_at"),
        u64_field(&body, "downloads"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RegistryClient;

    fn session() -> McpSession {
        McpSession::new(RegistryClient::new("http://127.0.0.1:1"))
    }

    fn args(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn search_requires_provider_name() {
        let err = dispatch(
            &session(),
            "search_providers",
            args(serde_json::json!({"service_slug": "s3_bucket"})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(n) if n == "provider_name"));
    }

    #[tokio::test]
    async fn search_rejects_unknown_data_type() {
        let err = dispatch(
            &session(),
            "search_providers",
            args(serde_json::json!({
                "provider_name": "aws",
                "service_slug": "s3_bucket",
                "provider_data_type": "recipes"
            })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, McpError::InvalidArg { name, .. } if name == "provider_data_type"));
    }

    #[tokio::test]
    async fn details_requires_doc_id() {
        let err = dispatch(&session(), "get_provider_details", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(n) if n == "provider_doc_id"));
    }

    #[test]
    fn tool_defs_cover_all_dispatched_names() {
        let names: Vec<String> = tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "search_providers",
                "get_provider_details",
                "get_latest_provider_version"
            ]
        );
    }
}
