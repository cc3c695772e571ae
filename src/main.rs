//! terraform-mcp executable: stdio MCP server.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use terraform_mcp::{
    build_route_table, cloud_routes, registry_routes, CloudClient, McpServer, McpSession,
    RegistryClient, Result, ToolRegistry, DEFAULT_REGISTRY_URL, DEFAULT_TFC_ADDRESS,
};

/// MCP server for the Terraform registry and HCP Terraform.
#[derive(Debug, Parser)]
#[command(name = "terraform-mcp", version, about)]
struct Args {
    /// Base URL of the public Terraform registry.
    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    registry_url: String,

    /// Base URL of the HCP Terraform (Terraform Cloud/Enterprise) API.
    #[arg(long, default_value = DEFAULT_TFC_ADDRESS)]
    tfc_address: String,

    /// HCP Terraform API token. Enables the organization/workspace tools and
    /// the terraform:// resources.
    #[arg(long, env = "TFE_TOKEN", hide_env_values = true)]
    tfc_token: Option<String>,

    /// Log filter (e.g. "info", "terraform_mcp=debug").
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = RegistryClient::new(&args.registry_url);
    let (session, tools, sub_tables) = match args.tfc_token.as_deref() {
        Some(token) => {
            let cloud = CloudClient::new(&args.tfc_address, token)?;
            (
                McpSession::with_cloud(registry, cloud),
                ToolRegistry::with_cloud(),
                vec![registry_routes(), cloud_routes()],
            )
        }
        None => (
            McpSession::new(registry),
            ToolRegistry::new(),
            vec![registry_routes()],
        ),
    };

    let router = build_route_table(sub_tables)?;
    let server = McpServer::new(session, tools, router);
    server.run().await
}
