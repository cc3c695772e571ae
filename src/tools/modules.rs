//! Module registry tools.
//!
//! Tools: search_modules, get_module_details

use serde_json::{Map, Value as JsonValue};

use crate::convert::{get_optional_u64, get_string_arg, str_field, u64_field};
use crate::error::{McpError, Result};
use crate::markdown;
use crate::resources::registry::render_module;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;

/// Get all module tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search_modules",
            "Search the public Terraform registry for modules. Returns module IDs with download \
             counts and descriptions, most relevant first. Pass offset to page through results. \
             Use get_module_details with a returned ID for inputs, outputs, and examples.",
            schema!(object {
                required: { "module_query": string },
                optional: { "offset": integer }
            }),
        ),
        ToolDef::new(
            "get_module_details",
            "Fetch details for one module by ID (e.g. 'terraform-aws-modules/vpc/aws'): latest \
             version, inputs, outputs, and examples.",
            schema!(object {
                required: { "module_id": string }
            }),
        ),
    ]
}

/// Dispatch a module tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<String> {
    match name {
        "search_modules" => search_modules(session, &args).await,
        "get_module_details" => get_module_details(session, &args).await,
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn search_modules(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let query = get_string_arg(args, "module_query")?;
    let offset = get_optional_u64(args, "offset").unwrap_or(0).to_string();
    let body = session
        .registry()
        .get_json(
            "/v1/modules/search",
            &[("q", query.as_str()), ("offset", offset.as_str()), ("limit", "15")],
        )
        .await?;

    let empty = Vec::new();
    let modules = body
        .get("modules")
        .and_then(|m| m.as_array())
        .unwrap_or(&empty);
    if modules.is_empty() {
        return Ok(format!("No modules found for '{query}'."));
    }

    let rows: Vec<Vec<String>> = modules
        .iter()
        .map(|m| {
            vec![
                format!(
                    "`{}/{}/{}`",
                    str_field(m, "namespace"),
                    str_field(m, "name"),
                    str_field(m, "provider")
                ),
                u64_field(m, "downloads").to_string(),
                m.get("verified")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false)
                    .to_string(),
                str_field(m, "description").replace('\n', " "),
            ]
        })
        .collect();

    let mut text = format!("# Module search results for '{query}'\n\n");
    text.push_str(&markdown::table(
        &["Module ID", "Downloads", "Verified", "Description"],
        &rows,
    ));
    Ok(text)
}

async fn get_module_details(session: &McpSession, args: &Map<String, JsonValue>) -> Result<String> {
    let module_id = get_string_arg(args, "module_id")?;
    // IDs are namespace/name/provider with an optional trailing version; the
    // v1 API accepts both forms as a path.
    let path: String = module_id
        .trim_matches('/')
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if path.is_empty() {
        return Err(McpError::InvalidArg {
            name: "module_id".to_string(),
            reason: "expected namespace/name/provider".to_string(),
        });
    }

    let body = session
        .registry()
        .get_json(&format!("/v1/modules/{path}"), &[])
        .await?;
    Ok(render_module(
        str_field(&body, "namespace"),
        str_field(&body, "name"),
        str_field(&body, "provider"),
        &body,
    ))
}
