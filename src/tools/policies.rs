//! Sentinel policy library tools.
//!
//! Tools: search_policies, get_policy_details
//!
//! The v2 policies endpoint has no server-side text search, so
//! `search_policies` pages the newest libraries and filters locally on name
//! and title.

use serde_json::{Map, Value as JsonValue};

use crate::convert::{get_string_arg, str_field};
use crate::error::{McpError, Result};
use crate::markdown;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;

/// Get all policy tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_policies",
            "Search the public Terraform registry for Sentinel policy libraries by name or \
             title. Returns matching policy IDs; use get_policy_details with an ID for the \
             full README and contained policies.",
            schema!(object {
                required: { "policy_query": string }
            }),
        ),
        ToolDef::new(
            "get_policy_details",
            "Fetch one Sentinel policy library by ID (as returned by search_policies): its \
             README and the policies it contains.",
            schema!(object {
                required: { "terraform_policy_id": string }
            }),
        ),
    ]
}

/// Dispatch a policy tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "search_policies" => search_policies(session, &args).await,
        "get_policy_details" => get_policy_details(session, &args).await,
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn search_policies(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let query = get_string_arg(args, "policy_query")?;
    let body = session
        .registry()
        .get_json(
            "/v2/policies",
            &[("page[size]", "100"), ("sort", "-downloads")],
        )
        .await?;

    let needle = query.to_lowercase();
    let empty = Vec::new();
    let matches: Vec<&JsonValue> = body
        .get("data")
        .and_then(|d| d.as_array())
        .unwrap_or(&empty)
        .iter()
        .filter(|policy| {
            let field = |key: &str| {
                policy
                    .pointer(&format!("/attributes/{key}"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_lowercase()
            };
            field("name").contains(&needle) || field("title").contains(&needle)
        })
        .collect();

    if matches.is_empty() {
        return Ok(format!("No policy libraries found for '{query}'."));
    }

    let mut text = format!("# Policy libraries matching '{query}'\n\n");
    for policy in matches {
        let attrs = policy.get("attributes").cloned().unwrap_or(JsonValue::Null);
        let title = str_field(&attrs, "title");
        let name = str_field(&attrs, "name");
        text.push_str(&format!(
            "- **{}** (id: `{}`, downloads: {})\n",
            if title.is_empty() { name } else { title },
            str_field(policy, "id"),
            attrs.get("downloads").and_then(|v| v.as_u64()).unwrap_or(0),
        ));
    }
    Ok(text)
}

async fn get_policy_details(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let policy_id = get_string_arg(args, "terraform_policy_id")?;
    // IDs come back from search as paths like "policies/hashicorp/aws-fsf/1.0.0".
    let path: String = policy_id
        .trim_matches('/')
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let body = session
        .registry()
        .get_json(&format!("/v2/{path}"), &[("include", "policies")])
        .await?;

    let attrs = body
        .get("data")
        .and_then(|d| d.get("attributes"))
        .cloned()
        .unwrap_or(JsonValue::Null);
    let title = str_field(&attrs, "title");
    let name = str_field(&attrs, "name");
    let mut text = format!(
        "# Policy library {}\n\n",
        if title.is_empty() { name } else { title }
    );

    if let Some(included) = body.get("included").and_then(|i| i.as_array()) {
        let names: Vec<String> = included
            .iter()
            .filter_map(|p| {
                p.pointer("/attributes/name")
                    .and_then(|v| v.as_str())
                    .map(|n| format!("`{n}`"))
            })
            .collect();
        if !names.is_empty() {
            text.push_str(&format!("**Policies**: {}\n\n", names.join(", ")));
        }
    }

    let readme = str_field(&attrs, "readme");
    if readme.is_empty() {
        text.push_str("No README published for this policy library.\n");
    } else {
        text.push_str(markdown::strip_frontmatter(readme).trim_start());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RegistryClient;

    fn session() -> McpSession {
        McpSession::new(RegistryClient::new("http://127.0.0.1:1"))
    }

    #[tokio::test]
    async fn search_requires_query() {
        let err = dispatch(&session(), "search_policies", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(n) if n == "policy_query"));
    }

    #[tokio::test]
    async fn details_requires_policy_id() {
        let err = dispatch(&session(), "get_policy_details", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(n) if n == "terraform_policy_id"));
    }

    #[test]
    fn tool_defs_cover_all_dispatched_names() {
        let names: Vec<String> = tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["search_policies", "get_policy_details"]);
    }
}
