//! Public registry resource handlers (`registry://` namespace).
//!
//! Each handler issues one registry HTTP call and shapes the JSON response
//! into a markdown resource payload. Container URIs answer list-style, leaf
//! URIs answer read-style.

use crate::convert::{str_field, u64_field};
use crate::markdown;
use crate::resources::{
    HandlerFuture, ResourceContents, ResourceDescriptor, RouteEntry, RouteRequest, RouteResult,
};
use crate::session::McpSession;

/// The registry namespace sub-table, in matching order.
pub fn routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry {
            pattern: "registry://providers",
            name: "Terraform providers",
            description: "Most-downloaded providers on the public Terraform registry",
            handler: providers_list,
        },
        RouteEntry {
            pattern: "registry://providers/{namespace}/{provider}",
            name: "Provider overview",
            description: "Latest version and overview for one provider",
            handler: provider_read,
        },
        RouteEntry {
            pattern: "registry://modules",
            name: "Terraform modules",
            description: "Verified modules on the public Terraform registry",
            handler: modules_list,
        },
        RouteEntry {
            pattern: "registry://modules/{namespace}/{name}/{provider}",
            name: "Module details",
            description: "Inputs, outputs, and versions for one module",
            handler: module_read,
        },
    ]
}

fn providers_list(session: &McpSession, _req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = session
            .registry()
            .get_json("/v2/providers", &[("page[size]", "25"), ("sort", "-downloads")])
            .await?;
        let empty = Vec::new();
        let providers = body
            .get("data")
            .and_then(|d| d.as_array())
            .unwrap_or(&empty);

        let items = providers
            .iter()
            .filter_map(|p| {
                let attrs = p.get("attributes")?;
                let namespace = str_field(attrs, "namespace");
                let name = str_field(attrs, "name");
                if namespace.is_empty() || name.is_empty() {
                    return None;
                }
                Some(ResourceDescriptor::markdown(
                    format!("registry://providers/{namespace}/{name}"),
                    format!("{namespace}/{name}"),
                    Some(str_field(attrs, "description").to_string()),
                ))
            })
            .collect();
        Ok(RouteResult::Resources(items))
    })
}

fn provider_read(session: &McpSession, req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let namespace = req.param("namespace")?.to_string();
        let provider = req.param("provider")?.to_string();
        let body = session
            .registry()
            .get_json(&format!("/v1/providers/{namespace}/{provider}"), &[])
            .await?;

        let mut text = format!("# Provider {namespace}/{provider}\n\n");
        let description = str_field(&body, "description");
        if !description.is_empty() {
            text.push_str(&format!("{description}\n\n"));
        }
        text.push_str(&format!(
            "- **Latest version**: {}\n- **Downloads**: {}\n- **Source**: {}\n- **Tier**: {}\n",
            str_field(&body, "version"),
            u64_field(&body, "downloads"),
            str_field(&body, "source"),
            str_field(&body, "tier"),
        ));
        if let Some(versions) = body.get("versions").and_then(|v| v.as_array()) {
            let recent: Vec<&str> = versions
                .iter()
                .rev()
                .take(10)
                .filter_map(|v| v.as_str())
                .collect();
            if !recent.is_empty() {
                text.push_str(&format!("\n**Recent versions**: {}\n", recent.join(", ")));
            }
        }
        Ok(RouteResult::Resource(ResourceContents::markdown(req.uri, text)))
    })
}

fn modules_list(session: &McpSession, _req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = session
            .registry()
            .get_json("/v1/modules", &[("limit", "25"), ("verified", "true")])
            .await?;
        let empty = Vec::new();
        let modules = body
            .get("modules")
            .and_then(|m| m.as_array())
            .unwrap_or(&empty);

        let items = modules
            .iter()
            .filter_map(|m| {
                let namespace = str_field(m, "namespace");
                let name = str_field(m, "name");
                let provider = str_field(m, "provider");
                if namespace.is_empty() || name.is_empty() || provider.is_empty() {
                    return None;
                }
                Some(ResourceDescriptor::markdown(
                    format!("registry://modules/{namespace}/{name}/{provider}"),
                    format!("{namespace}/{name}/{provider}"),
                    Some(str_field(m, "description").to_string()),
                ))
            })
            .collect();
        Ok(RouteResult::Resources(items))
    })
}

fn module_read(session: &McpSession, req: RouteRequest) -> HandlerFuture<'_> {
    Box::pin(async move {
        let namespace = req.param("namespace")?.to_string();
        let name = req.param("name")?.to_string();
        let provider = req.param("provider")?.to_string();
        let body = session
            .registry()
            .get_json(&format!("/v1/modules/{namespace}/{name}/{provider}"), &[])
            .await?;
        let text = render_module(&namespace, &name, &provider, &body);
        Ok(RouteResult::Resource(ResourceContents::markdown(req.uri, text)))
    })
}

/// Render the module detail payload as markdown. Shared with the
/// `get_module_details` tool.
pub(crate) fn render_module(
    namespace: &str,
    name: &str,
    provider: &str,
    body: &serde_json::Value,
) -> String {
    let mut text = format!("# Module {namespace}/{name}/{provider}\n\n");
    let description = str_field(body, "description");
    if !description.is_empty() {
        text.push_str(&format!("{description}\n\n"));
    }
    text.push_str(&format!(
        "- **Latest version**: {}\n- **Downloads**: {}\n- **Verified**: {}\n- **Source**: {}\n",
        str_field(body, "version"),
        u64_field(body, "downloads"),
        body.get("verified").and_then(|v| v.as_bool()).unwrap_or(false),
        str_field(body, "source"),
    ));

    if let Some(versions) = body.get("versions").and_then(|v| v.as_array()) {
        let recent: Vec<&str> = versions.iter().rev().take(10).filter_map(|v| v.as_str()).collect();
        if !recent.is_empty() {
            text.push_str(&format!("\n**Recent versions**: {}\n", recent.join(", ")));
        }
    }

    if let Some(root) = body.get("root") {
        if let Some(inputs) = root.get("inputs").and_then(|v| v.as_array()) {
            if !inputs.is_empty() {
                let rows: Vec<Vec<String>> = inputs
                    .iter()
                    .map(|i| {
                        vec![
                            format!("`{}`", str_field(i, "name")),
                            format!("`{}`", str_field(i, "type")),
                            str_field(i, "description").replace('\n', " "),
                        ]
                    })
                    .collect();
                text.push_str("\n## Inputs\n\n");
                text.push_str(&markdown::table(&["Name", "Type", "Description"], &rows));
            }
        }
        if let Some(outputs) = root.get("outputs").and_then(|v| v.as_array()) {
            if !outputs.is_empty() {
                let rows: Vec<Vec<String>> = outputs
                    .iter()
                    .map(|o| {
                        vec![
                            format!("`{}`", str_field(o, "name")),
                            str_field(o, "description").replace('\n', " "),
                        ]
                    })
                    .collect();
                text.push_str("\n## Outputs\n\n");
                text.push_str(&markdown::table(&["Name", "Description"], &rows));
            }
        }
    }

    if let Some(readme) = body.pointer("/root/readme").and_then(|v| v.as_str()) {
        if !readme.trim().is_empty() {
            text.push_str("\n## README\n\n");
            text.push_str(&markdown::excerpt(readme, 1500));
            text.push('\n');
        }
    }

    if let Some(examples) = body.get("examples").and_then(|v| v.as_array()) {
        let names: Vec<&str> = examples
            .iter()
            .map(|e| str_field(e, "name"))
            .filter(|n| !n.is_empty())
            .collect();
        if !names.is_empty() {
            text.push_str(&format!("\n**Examples**: {}\n", names.join(", ")));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_are_ordered_and_registry_scoped() {
        let table = routes();
        assert_eq!(table[0].pattern, "registry://providers");
        assert!(table.iter().all(|e| e.pattern.starts_with("registry://")));
    }

    #[test]
    fn render_module_includes_inputs_and_outputs() {
        let body = json!({
            "description": "Terraform module which creates VPC resources on AWS",
            "version": "6.0.1",
            "downloads": 12345678,
            "verified": true,
            "source": "https://github.com/terraform-aws-modules/terraform-aws-vpc",
            "versions": ["5.9.0", "6.0.0", "6.0.1"],
            "root": {
                "readme": "---\ntitle: vpc\n---\n\n# AWS VPC Terraform module\n\nCreates VPC resources.",
                "inputs": [
                    {"name": "cidr", "type": "string", "description": "The IPv4 CIDR\nblock"}
                ],
                "outputs": [
                    {"name": "vpc_id", "description": "The ID of the VPC"}
                ]
            },
            "examples": [{"name": "complete"}, {"name": "simple"}]
        });
        let text = render_module("terraform-aws-modules", "vpc", "aws", &body);
        assert!(text.starts_with("# Module terraform-aws-modules/vpc/aws"));
        assert!(text.contains("## Inputs"));
        assert!(text.contains("| `cidr` | `string` | The IPv4 CIDR block |"));
        assert!(text.contains("## Outputs"));
        assert!(text.contains("`vpc_id`"));
        assert!(text.contains("## README"));
        assert!(text.contains("# AWS VPC Terraform module"));
        assert!(!text.contains("title: vpc"));
        assert!(text.contains("**Examples**: complete, simple"));
        assert!(text.contains("6.0.1, 6.0.0, 5.9.0"));
    }

    #[test]
    fn render_module_tolerates_sparse_payload() {
        let text = render_module("ns", "name", "prov", &json!({}));
        assert!(text.starts_with("# Module ns/name/prov"));
        assert!(!text.contains("## Inputs"));
    }
}
