use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub mod analysis;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(analysis::analyze_game))
        .route("/api/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Starts an engine and shuts it straight down again.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response
///
/// - `200 OK`: `{"status": "healthy", "stockfish": "connected"}`
/// - `500 Internal Server Error`: `{"status": "unhealthy", "error": ...}`
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let probe = tokio::task::spawn_blocking(move || {
        // The session is dropped right away, which quits the engine.
        state.launcher.launch().map(drop).map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(format!("Health probe failed: {e}")));

    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "stockfish": "connected" })),
        )
            .into_response(),
        Err(message) => {
            tracing::warn!("Engine health probe failed: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "unhealthy", "error": message })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{body::to_bytes, response::Response};
    use chess_review_core::{EngineError, EngineLauncher, Evaluation, Evaluator, GameLine, StockfishLauncher};
    use serde_json::Value;
    use shakmaty::Position;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::AppState;

    /// Says white is a little better, every time.
    struct SteadyEngine;

    impl Evaluator for SteadyEngine {
        fn evaluate(&mut self, line: &GameLine<'_>, _depth: u32) -> Result<Option<Evaluation>, EngineError> {
            let cp = if line.position.turn().is_white() { 25 } else { -25 };
            Ok(Some(Evaluation::Centipawns(cp)))
        }
    }

    pub struct SteadyLauncher;

    impl EngineLauncher for SteadyLauncher {
        fn launch(&self) -> Result<Box<dyn Evaluator + Send>, EngineError> {
            Ok(Box::new(SteadyEngine))
        }
    }

    pub fn state_with(launcher: Box<dyn EngineLauncher>) -> Arc<AppState> {
        Arc::new(AppState {
            config: Config {
                max_depth: 20,
                ..Config::default()
            },
            launcher,
        })
    }

    pub fn working_state() -> Arc<AppState> {
        state_with(Box::new(SteadyLauncher))
    }

    pub fn missing_engine_state() -> Arc<AppState> {
        state_with(Box::new(StockfishLauncher::new("/nonexistent/path/to/stockfish")))
    }

    /// Helper to extract response body as JSON
    pub async fn body_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
