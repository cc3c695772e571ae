//! End-to-end routing behavior through the public library API.

use serde_json::json;
use terraform_mcp::{
    build_route_table, cloud_routes, extract_params, matches, registry_routes, JsonRpcRequest,
    McpServer, McpSession, RegistryClient, ToolRegistry,
};

fn server() -> McpServer {
    // Closed port: any handler that reaches the network fails fast, which is
    // exactly what the failure-path assertions need.
    let session = McpSession::new(RegistryClient::new("http://127.0.0.1:1"));
    let router = build_route_table(vec![registry_routes(), cloud_routes()])
        .expect("static route table is valid");
    McpServer::new(session, ToolRegistry::new(), router)
}

fn request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 42,
        "method": method,
        "params": params
    }))
    .expect("valid request JSON")
}

#[test]
fn provider_pattern_matches_and_extracts() {
    let pattern = "registry://providers/{namespace}/{provider}";
    assert!(matches("registry://providers/hashicorp/aws", pattern));
    let params = extract_params("registry://providers/hashicorp/aws", pattern);
    assert_eq!(params["namespace"], "hashicorp");
    assert_eq!(params["provider"], "aws");
}

#[test]
fn short_uri_does_not_match_provider_pattern() {
    assert!(!matches(
        "registry://providers/hashicorp",
        "registry://providers/{namespace}/{provider}"
    ));
}

#[test]
fn literal_pattern_matches_with_empty_params() {
    assert!(matches("registry://modules", "registry://modules"));
    assert!(extract_params("registry://modules", "registry://modules").is_empty());
}

#[test]
fn workspace_pattern_extracts_org_and_workspace() {
    let pattern = "terraform://organizations/{org}/workspaces/{workspace}";
    let uri = "terraform://organizations/acme/workspaces/ws-123";
    assert!(matches(uri, pattern));
    let params = extract_params(uri, pattern);
    assert_eq!(params["org"], "acme");
    assert_eq!(params["workspace"], "ws-123");
}

#[tokio::test]
async fn unknown_uri_yields_structured_not_found() {
    let response = server()
        .handle_request(request("resources/read", json!({"uri": "unknown://foo"})))
        .await;
    let error = response.error.expect("not found surfaces as an error object");
    assert!(error.message.contains("unknown://foo"));
}

#[tokio::test]
async fn handler_failure_never_escapes_the_router() {
    // registry://modules is routable but its HTTP call fails; the response is
    // still a structured error, not a transport fault.
    let response = server()
        .handle_request(request("resources/read", json!({"uri": "registry://modules"})))
        .await;
    assert!(response.error.is_some());
}

#[tokio::test]
async fn malformed_uri_yields_structured_result() {
    let response = server()
        .handle_request(request("resources/read", json!({"uri": "no separator here"})))
        .await;
    let error = response.error.expect("malformed URI is not-found, not a crash");
    assert!(error.message.contains("no separator here"));
}

#[tokio::test]
async fn full_surface_is_listable_without_network() {
    let server = server();

    let tools = server.handle_request(request("tools/list", json!({}))).await;
    assert!(tools.result.is_some());

    let roots = server.handle_request(request("resources/list", json!({}))).await;
    let uris: Vec<String> = roots.result.expect("result")["resources"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["uri"].as_str().map(str::to_string))
        .collect();
    assert!(uris.contains(&"registry://providers".to_string()));
    assert!(uris.contains(&"terraform://organizations".to_string()));

    let templates = server
        .handle_request(request("resources/templates/list", json!({})))
        .await;
    let count = templates.result.expect("result")["resourceTemplates"]
        .as_array()
        .expect("array")
        .len();
    assert_eq!(count, registry_routes().len() + cloud_routes().len());
}
