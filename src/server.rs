use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use hteng_catalog::{config::ServerConfig, http, logging, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("HTENG_CONFIG").map(PathBuf::from);
    let config = ServerConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    logging::init(&config.log);
    info!(version = VERSION, csv = %config.csv_path.display(), "Starting catalog server");

    http::serve(config).await.context("Server error")?;
    Ok(())
}
