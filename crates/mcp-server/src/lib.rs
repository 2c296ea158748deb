//! BMLT MCP Server
//!
//! Exposes a BMLT root server's `client_interface` API to AI agents via the MCP protocol.
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "bmlt": {
//!       "command": "bmlt-mcp",
//!       "env": { "BMLT_ROOT_SERVER_URL": "https://bmlt.example.org/main_server/" }
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use bmlt_directory::{ClientConfig, DirectoryClient};
use bmlt_geocoding::{
    GeocodeClient, GeocodeContext, GeocoderConfig, NominatimTransport, SmartGeocoder,
    NOMINATIM_SEARCH_URL,
};
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub mod tools;

pub use tools::BmltService;

#[derive(Parser, Debug)]
#[command(name = "bmlt-mcp")]
#[command(about = "MCP server for BMLT meeting directories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Root server URL, e.g. https://bmlt.example.org/main_server/
    #[arg(long, env = "BMLT_ROOT_SERVER_URL")]
    pub root_server_url: Option<String>,

    /// HTTP timeout for root server requests, in milliseconds
    #[arg(long, env = "BMLT_TIMEOUT", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// User-Agent sent to the root server
    #[arg(long, env = "BMLT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Nominatim-compatible search endpoint used to geocode addresses
    #[arg(long, env = "BMLT_GEOCODER_URL", default_value = NOMINATIM_SEARCH_URL)]
    pub geocoder_url: String,

    /// Print the tool catalog as JSON and exit
    #[arg(long)]
    pub print_tools: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_tools {
        return print_tools();
    }

    // stdout carries the MCP protocol
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let service = build_service(&cli)?;
    log::info!(
        "Starting BMLT MCP server for {}",
        cli.root_server_url.as_deref().unwrap_or_default()
    );

    let server = service.serve(stdio()).await?;
    log::info!(
        "BMLT MCP server connected; {} tools available",
        BmltService::tool_catalog().len()
    );
    server.waiting().await?;

    log::info!("BMLT MCP server stopped");
    Ok(())
}

pub fn build_service(cli: &Cli) -> Result<BmltService> {
    let root = cli.root_server_url.clone().context(
        "BMLT_ROOT_SERVER_URL (or --root-server-url) is required, \
         e.g. https://bmlt.example.org/main_server/",
    )?;

    let geocoder = NominatimTransport::new(GeocoderConfig {
        endpoint: cli.geocoder_url.clone(),
        ..GeocoderConfig::default()
    })
    .context("build geocoding HTTP client")?;
    let context = Arc::new(GeocodeContext::default());
    let resolver = SmartGeocoder::new(GeocodeClient::new(geocoder, context));

    let mut config = ClientConfig::new(root).with_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(user_agent) = &cli.user_agent {
        config = config.with_user_agent(user_agent.clone());
    }
    let client = DirectoryClient::new(config, Arc::new(resolver))
        .context("build root server HTTP client")?;

    Ok(BmltService::new(Arc::new(client)))
}

fn print_tools() -> Result<()> {
    let payload = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "tools": BmltService::tool_catalog(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
