//! Symptom Diagnosis - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== Symptom Diagnosis v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await.context("running server")?;

    Ok(())
}
