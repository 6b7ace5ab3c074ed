//! Novel crawler daemon: crawls once at startup, then on a fixed schedule.

use anyhow::{Context, Result};
use novel_crawler::config::Config;
use novel_crawler::runner::JobRunner;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    info!(
        "Writing EPUBs to {}, covers to {}",
        config.paths.output_directory.display(),
        config.paths.assets_directory.display()
    );

    let runner = JobRunner::new(config).context("Failed to create HTTP client")?;
    runner.run_forever().await;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
