//! HCP Terraform resource handlers (`terraform://` namespace).
//!
//! These routes are only registered when a token was configured at startup;
//! see `main.rs`. The v2 API speaks JSON:API, so payloads are `data` arrays
//! of `{id, attributes}` objects.

use serde_json::Value as JsonValue;

use crate::convert::str_field;
use crate::resources::{
    HandlerFuture, ResourceContents, ResourceDescriptor, RouteEntry, RouteRequest, RouteResult,
};
use crate::session::McpSession;

/// The cloud namespace sub-table, in matching order.
pub fn routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry {
            pattern: "terraform://organizations",
            name: "Organizations",
            description: "HCP Terraform organizations visible to the configured token",
            handler: organizations_list,
        },
        RouteEntry {
            pattern: "terraform://organizations/{org}/workspaces",
            name: "Workspaces",
            description: "Workspaces in one organization",
            handler: workspaces_list,
        },
        RouteEntry {
            pattern: "terraform://organizations/{org}/workspaces/{workspace}",
            name: "Workspace details",
            description: "Configuration and status of one workspace",
            handler: workspace_read,
        },
    ]
}

fn organizations_list(session: &McpSession, _req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = session.cloud()?.get_json("/api/v2/organizations", &[]).await?;
        let items = data_array(&body)
            .iter()
            .filter_map(|org| {
                let id = str_field(org, "id");
                if id.is_empty() {
                    return None;
                }
                let email = org
                    .get("attributes")
                    .map(|a| str_field(a, "email").to_string())
                    .filter(|e| !e.is_empty());
                Some(ResourceDescriptor::markdown(
                    format!("terraform://organizations/{id}/workspaces"),
                    id,
                    email,
                ))
            })
            .collect();
        Ok(RouteResult::Resources(items))
    })
}

fn workspaces_list(session: &McpSession, req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let org = req.param("org")?.to_string();
        let body = session
            .cloud()?
            .get_json(
                &format!("/api/v2/organizations/{org}/workspaces"),
                &[("page[size]", "50")],
            )
            .await?;
        let items = data_array(&body)
            .iter()
            .filter_map(|ws| {
                let attrs = ws.get("attributes")?;
                let name = str_field(attrs, "name");
                if name.is_empty() {
                    return None;
                }
                Some(ResourceDescriptor::markdown(
                    format!("terraform://organizations/{org}/workspaces/{name}"),
                    name,
                    Some(str_field(attrs, "description").to_string()),
                ))
            })
            .collect();
        Ok(RouteResult::Resources(items))
    })
}

fn workspace_read(session: &McpSession, req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let org = req.param("org")?.to_string();
        let workspace = req.param("workspace")?.to_string();
        let body = session
            .cloud()?
            .get_json(
                &format!("/api/v2/organizations/{org}/workspaces/{workspace}"),
                &[],
            )
            .await?;
        let text = render_workspace(&org, &workspace, &body);
        Ok(RouteResult::Resource(ResourceContents::markdown(req.uri, text)))
    })
}

fn data_array(body: &JsonValue) -> Vec<&JsonValue> {
    body.get("data")
        .and_then(|d| d.as_array())
        .map(|a| a.iter().collect())
        .unwrap_or_default()
}

/// Render a workspace detail payload as markdown. Shared with the
/// `get_workspace_details` tool.
pub(crate) fn render_workspace(org: &str, workspace: &str, body: &JsonValue) -> String {
    let data = body.get("data").unwrap_or(body);
    let empty = JsonValue::Null;
    let attrs = data.get("attributes").unwrap_or(&empty);

    let mut text = format!("# Workspace {org}/{workspace}\n\n");
    let description = str_field(attrs, "description");
    if !description.is_empty() {
        text.push_str(&format!("{description}\n\n"));
    }
    text.push_str(&format!(
        "- **ID**: {}\n\
         - **Terraform version**: {}\n\
         - **Execution mode**: {}\n\
         - **Auto apply**: {}\n\
         - **Working directory**: {}\n\
         - **Resource count**: {}\n\
         - **Updated at**: {}\n",
        str_field(data, "id"),
        str_field(attrs, "terraform-version"),
        str_field(attrs, "execution-mode"),
        attrs.get("auto-apply").and_then(|v| v.as_bool()).unwrap_or(false),
        str_field(attrs, "working-directory"),
        attrs.get("resource-count").and_then(|v| v.as_u64()).unwrap_or(0),
        str_field(attrs, "updated-at"),
    ));

    let vcs = attrs.get("vcs-repo").filter(|v| !v.is_null());
    if let Some(vcs) = vcs {
        text.push_str(&format!(
            "- **VCS repo**: {} ({})\n",
            str_field(vcs, "identifier"),
            str_field(vcs, "branch"),
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_are_cloud_scoped() {
        let table = routes();
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|e| e.pattern.starts_with("terraform://")));
    }

    #[test]
    fn render_workspace_reads_jsonapi_attributes() {
        let body = json!({
            "data": {
                "id": "ws-abc123",
                "attributes": {
                    "name": "networking",
                    "description": "Core VPC layout",
                    "terraform-version": "1.9.5",
                    "execution-mode": "remote",
                    "auto-apply": true,
                    "working-directory": "envs/prod",
                    "resource-count": 42,
                    "updated-at": "2026-08-01T12:00:00Z",
                    "vcs-repo": {"identifier": "acme/infra", "branch": "main"}
                }
            }
        });
        let text = render_workspace("acme", "networking", &body);
        assert!(text.starts_with("# Workspace acme/networking"));
        assert!(text.contains("Core VPC layout"));
        assert!(text.contains("- **ID**: ws-abc123"));
        assert!(text.contains("- **Terraform version**: 1.9.5"));
        assert!(text.contains("- **Auto apply**: true"));
        assert!(text.contains("- **VCS repo**: acme/infra (main)"));
    }

    #[test]
    fn render_workspace_tolerates_sparse_payload() {
        let text = render_workspace("acme", "empty", &json!({}));
        assert!(text.starts_with("# Workspace acme/empty"));
        assert!(!text.contains("VCS repo"));
    }
}
