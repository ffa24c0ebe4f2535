//! Travel assistant HTTP server.

use anyhow::Result;
use tracing::info;

use server::Config;

#[tokio::main]
async fn main() -> Result<()> {
    server::init_tracing();

    let config = Config::from_env()?;
    info!(
        port = config.port,
        llm = %config.llm_base_url,
        provider = %config.flight_provider_url,
        "Starting travel assistant server"
    );

    server::serve(config).await
}
