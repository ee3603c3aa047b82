use std::sync::Arc;

use chess_review_core::{EngineLauncher, StockfishLauncher};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;

use config::Config;

pub struct AppState {
    pub config: Config,
    pub launcher: Box<dyn EngineLauncher>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(
        engine = %config.stockfish_path,
        default_depth = config.default_depth,
        max_depth = config.max_depth,
        "Loaded configuration"
    );

    let state = Arc::new(AppState {
        launcher: Box::new(StockfishLauncher::new(config.stockfish_path.clone())),
        config,
    });

    let addr = state.config.addr();
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
