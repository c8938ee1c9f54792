use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

use tidymodels_mcp::TidymodelsService;
use tidymodels_mcp::config::{
    DEFAULT_API_URL, DEFAULT_MAX_CONCURRENCY, DEFAULT_ORG, DEFAULT_REPO_TTL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, ServerConfig,
};

/// MCP server for browsing tidymodels packages on GitHub
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub organization to serve
    #[arg(long, env = "TIDYMODELS_MCP_ORG", default_value = DEFAULT_ORG)]
    org: String,

    /// GitHub token for higher rate limits (requests are unauthenticated without it)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Seconds before the cached repository list is refreshed
    #[arg(long, env = "TIDYMODELS_MCP_REPO_TTL", default_value_t = DEFAULT_REPO_TTL_SECS)]
    repo_ttl_secs: u64,

    /// Maximum concurrent GitHub requests per lookup
    #[arg(long, env = "TIDYMODELS_MCP_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    max_concurrency: usize,

    /// Timeout for a single GitHub request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            org: args.org,
            api_url: args.api_url,
            token: args.github_token.filter(|t| !t.is_empty()),
            repo_ttl: Duration::from_secs(args.repo_ttl_secs),
            max_concurrency: args.max_concurrency,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ServerConfig::from(args);
    tracing::info!(
        "Starting tidymodels MCP server on stdio for organization '{}' ({})",
        config.org,
        config.api_url
    );

    let tidymodels_service = TidymodelsService::new(config)?;

    // Serve using stdio transport
    let service = tidymodels_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;
    Ok(())
}
