//! Obstacle Pong Server
//!
//! Authoritative server for two-player Pong with obstacles.

use tracing::info;
use tracing_subscriber::EnvFilter;

use obstacle_pong::{GameServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;

    info!("Obstacle Pong Server v{}", VERSION);
    info!("Tick Rate: {} Hz", config.tick_rate);
    if let Some(seed) = config.rng_seed {
        info!("RNG Seed: {}", seed);
    }

    let server = std::sync::Arc::new(GameServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    info!("Server stopped");
    Ok(())
}
