use std::time::Duration;

use bookdiscover_api::{
    api::{cors_layer, create_router, AppState},
    config::Config,
    db,
    models::NewLogEntry,
    services::{log_event, shared_rng},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bookdiscover_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::migrate(&pool).await?;

    // Initialize application state and the background job worker
    let (state, worker) = AppState::new(
        pool,
        shared_rng(config.rng_seed),
        Duration::from_millis(config.sync_delay_ms),
    );

    log_event(
        state.events.as_ref(),
        NewLogEntry::new("INFO", "BookDiscover backend started", "backend"),
    )
    .await;

    let app = create_router(state).layer(cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        demo_mode = config.demo_mode,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
