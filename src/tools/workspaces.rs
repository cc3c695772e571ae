//! HCP Terraform organization and workspace tools.
//!
//! Tools: list_organizations, list_workspaces, get_workspace_details
//!
//! Registered only when a token is configured; see `ToolRegistry::with_cloud`.

use serde_json::{Map, Value as JsonValue};

use crate::convert::{get_optional_string, get_string_arg, str_field};
use crate::error::{McpError, Result};
use crate::markdown;
use crate::resources::cloud::render_workspace;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;

/// Get all workspace tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_organizations",
            "List the HCP Terraform organizations visible to the configured token.",
            schema!(object {}),
        ),
        ToolDef::new(
            "list_workspaces",
            "List workspaces in an HCP Terraform organization. Pass search to filter by \
             workspace name.",
            schema!(object {
                required: { "terraform_org_name": string },
                optional: { "search": string }
            }),
        ),
        ToolDef::new(
            "get_workspace_details",
            "Get configuration and status for one workspace in an organization.",
            schema!(object {
                required: { "terraform_org_name": string, "workspace_name": string }
            }),
        ),
    ]
}

/// Dispatch a workspace tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "list_organizations" => list_organizations(session).await,
        "list_workspaces" => list_workspaces(session, &args).await,
        "get_workspace_details" => get_workspace_details(session, &args).await,
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn list_organizations(session: &McpSession) -> Result<String> {
    let body = session.cloud()?.get_json("/api/v2/organizations", &[]).await?;
    let empty = Vec::new();
    let orgs = body.get("data").and_then(|d| d.as_array()).unwrap_or(&empty);
    if orgs.is_empty() {
        return Ok("No organizations visible to this token.".to_string());
    }

    let mut text = "# Organizations\n\n".to_string();
    for org in orgs {
        let attrs = org.get("attributes").cloned().unwrap_or(JsonValue::Null);
        text.push_str(&format!(
            "- **{}** (email: {})\n",
            str_field(org, "id"),
            str_field(&attrs, "email"),
        ));
    }
    Ok(text)
}

async fn list_workspaces(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let org = get_string_arg(args, "terraform_org_name")?;
    let search = get_optional_string(args, "search");
    let mut query: Vec<(&str, &str)> = vec![("page[size]", "50")];
    if let Some(search) = search.as_deref() {
        query.push(("search[name]", search));
    }

    let body = session
        .cloud()?
        .get_json(
            &format!(
                "/api/v2/organizations/{}/workspaces",
                urlencoding::encode(&org)
            ),
            &query,
        )
        .await?;

    let empty = Vec::new();
    let workspaces = body.get("data").and_then(|d| d.as_array()).unwrap_or(&empty);
    if workspaces.is_empty() {
        return Ok(format!("No workspaces found in organization '{org}'."));
    }

    let rows: Vec<Vec<String>> = workspaces
        .iter()
        .map(|ws| {
            let attrs = ws.get("attributes").cloned().unwrap_or(JsonValue::Null);
            vec![
                str_field(&attrs, "name").to_string(),
                str_field(ws, "id").to_string(),
                str_field(&attrs, "terraform-version").to_string(),
                attrs
                    .get("resource-count")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0)
                    .to_string(),
                str_field(&attrs, "updated-at").to_string(),
            ]
        })
        .collect();

    let mut text = format!("# Workspaces in {org}\n\n");
    text.push_str(&markdown::table(
        &["Name", "ID", "Terraform", "Resources", "Updated"],
        &rows,
    ));
    Ok(text)
}

async fn get_workspace_details(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let org = get_string_arg(args, "terraform_org_name")?;
    let workspace = get_string_arg(args, "workspace_name")?;
    let body = session
        .cloud()?
        .get_json(
            &format!(
                "/api/v2/organizations/{}/workspaces/{}",
                urlencoding::encode(&org),
                urlencoding::encode(&workspace)
            ),
            &[],
        )
        .await?;
    Ok(render_workspace(&org, &workspace, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RegistryClient;

    fn session() -> McpSession {
        McpSession::new(RegistryClient::new("http://127.0.0.1:1"))
    }

    #[tokio::test]
    async fn cloud_tools_fail_without_token() {
        let err = dispatch(&session(), "list_organizations", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::CloudNotConfigured));
    }

    #[tokio::test]
    async fn list_workspaces_requires_org() {
        let err = dispatch(&session(), "list_workspaces", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::MissingArg(n) if n == "terraform_org_name"));
    }

    #[test]
    fn tool_defs_cover_all_dispatched_names() {
        let names: Vec<String> = tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["list_organizations", "list_workspaces", "get_workspace_details"]
        );
    }
}
