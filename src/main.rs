use anyhow::{Context, Result};
use room_scout::{Config, Scanner};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    info!("{}", "=".repeat(60));
    info!("🏠 Room Scout started");
    info!(
        strategy = %config.fetch.strategy,
        "Search criteria: €{}-€{}, {} ({})",
        config.window.min(),
        config.window.max(),
        config.search.location,
        config.search.category
    );
    info!("{}", "=".repeat(60));

    let scanner = Scanner::from_config(&config)?;

    scanner
        .run_cycle()
        .await
        .context("Scan cycle aborted")?;

    Ok(())
}
