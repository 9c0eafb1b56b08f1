//! Idle Diagnostics Server - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = AppConfig::path_from_env();
    let config = AppConfig::load(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;

    init_logging(&config.logging)?;

    info!("=== MotoDiag idle diagnostics v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Models under {}, reference ranges from {:?}",
        config.models.root_dir.display(),
        config.ranges.path
    );

    run_server(config).await
}
