//! E-Gommerce API - Main Entry Point

use api::config::AppConfig;
use api::{init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging, config.log_format())?;

    info!("=== E-Gommerce API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.environment);

    run_server(config).await?;

    Ok(())
}
