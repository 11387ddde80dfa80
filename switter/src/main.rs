use std::sync::Arc;

use switter::{
    app::{build_router, build_state},
    config::Config,
};
use switter_graph::storage::rocksdb_store::RocksDbStorage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config)?;

    tracing::info!("Starting switter");
    tracing::info!("Configuration: {:?}", config);

    // Initialize storage
    let storage = Arc::new(RocksDbStorage::new(
        &config.database.path,
        &config.database.namespace,
    )?);

    tracing::info!("Database initialized at {}", config.database.path);

    let state = build_state(storage, &config.session).await?;
    let app = build_router(state);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.level))?;

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
