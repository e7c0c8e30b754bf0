use anyhow::Context;
use smartscreen::{init_logging, start, AppConfig, BUILD_DATE, VERSION};
use std::path::PathBuf;
use std::time::Duration;

/// How long pending draws get to reach the panel at exit
const EXIT_FLUSH: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("SmartScreen {} (built {})", VERSION, BUILD_DATE);

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = AppConfig::load_from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // queueing may block on backpressure, keep it off the runtime threads
    let manager = tokio::task::spawn_blocking(move || start(&config)).await??;
    tracing::info!("Display running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Stopping");

    tokio::task::spawn_blocking(move || {
        if let Err(e) = manager.turn_off() {
            tracing::warn!("Could not turn the screen off: {}", e);
        }
        if !manager.lcd().wait_idle(EXIT_FLUSH) {
            tracing::warn!("Display did not drain within {:?}", EXIT_FLUSH);
        }
        manager.lcd().shutdown();
    })
    .await?;

    Ok(())
}
