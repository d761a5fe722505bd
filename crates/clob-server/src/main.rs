//! TCP gateway binary for the matching engine.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use clob_server::{config::Config, events, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let (engine, event_bus) = events::wire_engine();
    let engine = Arc::new(engine);

    tokio::select! {
        result = server::run(config, engine.clone(), event_bus) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    // Drain whatever is still queued before exiting.
    engine.shutdown();
    Ok(())
}
