//! Game analysis endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use chess_review_core::{AnalysisResult, Error, GameAnalyzer};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub pgn: Option<String>,
    pub depth: Option<u32>,
}

/// Replays a PGN game through the engine and reports each move's cost.
///
/// # Endpoint
///
/// `POST /api/analyze` with `{"pgn": "...", "depth": 10}` (`depth` optional)
///
/// # Response
///
/// - `200 OK`: the full analysis
/// - `400 Bad Request`: missing PGN, invalid PGN or depth, engine failure
/// - `500 Internal Server Error`: unreadable body or anything unexpected
pub async fn analyze_game(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(body) = payload.map_err(|e| Error::Unexpected(e.body_text()))?;

    // Valid JSON that isn't an object carries no PGN.
    if !body.is_object() {
        return Err(ApiError::BadRequest("PGN required".to_string()));
    }
    let request: AnalyzeRequest =
        serde_json::from_value(body).map_err(|e| Error::Unexpected(format!("Invalid request body: {e}")))?;

    let pgn = request
        .pgn
        .ok_or_else(|| ApiError::BadRequest("PGN required".to_string()))?;
    let depth = request.depth.unwrap_or(state.config.default_depth);

    let result = tokio::task::spawn_blocking(move || {
        GameAnalyzer::new(state.launcher.as_ref())
            .with_max_depth(state.config.max_depth)
            .analyze(&pgn, depth)
    })
    .await
    .map_err(|e| Error::Unexpected(format!("Analysis task failed: {e}")))??;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use crate::routes::{router, test_support::*};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::AppState;

    async fn post_json(state: Arc<AppState>, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        router(state).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_analyze_short_game() {
        let body = json!({ "pgn": "1. e4 e5 2. Nf3", "depth": 1 }).to_string();
        let response = post_json(working_state(), &body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["total_moves"], 3);

        let evaluations = body["evaluations"].as_array().unwrap();
        let plies: Vec<u64> = evaluations.iter().map(|e| e["ply"].as_u64().unwrap()).collect();
        assert_eq!(plies, vec![1, 2, 3]);
        assert_eq!(evaluations[0]["move"], "e2e4");
        assert_eq!(evaluations[2]["san"], "Nf3");
        for e in evaluations {
            let change = e["score_after"].as_i64().unwrap() - e["score_before"].as_i64().unwrap();
            assert_eq!(e["score_change"].as_i64().unwrap(), change);
        }
    }

    #[tokio::test]
    async fn test_steady_engine_flags_nothing() {
        // The engine's opinion never moves, so no move costs anything.
        let body = json!({ "pgn": "1. d4 d5 2. c4 e6" }).to_string();
        let body = body_json(post_json(working_state(), &body).await).await;

        let changes: Vec<i64> = body["evaluations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["score_change"].as_i64().unwrap())
            .collect();
        assert_eq!(changes, vec![0, 0, 0, 0]);
        assert_eq!(body["mistakes"], json!([]));
        assert_eq!(body["blunders"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_pgn() {
        let response = post_json(working_state(), r#"{"depth": 5}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "PGN required" }));
    }

    #[tokio::test]
    async fn test_null_pgn() {
        let response = post_json(working_state(), r#"{"pgn": null}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "PGN required" }));
    }

    #[tokio::test]
    async fn test_body_that_is_not_an_object() {
        for body in ["[]", r#""1. e4""#, "42", "null"] {
            let response = post_json(working_state(), body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(body_json(response).await, json!({ "error": "PGN required" }));
        }
    }

    #[tokio::test]
    async fn test_wrong_field_type() {
        let response = post_json(working_state(), r#"{"pgn": 42}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_junk_in_movetext() {
        let body = json!({ "pgn": "1. e4 zzz e5" }).to_string();
        let response = post_json(working_state(), &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("zzz"));
        assert!(body.get("evaluations").is_none());
    }

    #[tokio::test]
    async fn test_invalid_pgn() {
        for pgn in ["", "1. e4 e5 2. Ke3"] {
            let body = json!({ "pgn": pgn }).to_string();
            let response = post_json(working_state(), &body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "pgn: {pgn:?}");

            let body: Value = body_json(response).await;
            assert!(body["error"].is_string());
            assert!(body.get("evaluations").is_none());
        }
    }

    #[tokio::test]
    async fn test_depth_out_of_range() {
        for depth in [0, 21] {
            let body = json!({ "pgn": "1. e4", "depth": depth }).to_string();
            let response = post_json(working_state(), &body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "depth {depth}");
        }
    }

    #[tokio::test]
    async fn test_engine_unavailable_is_a_bad_request() {
        let body = json!({ "pgn": "1. e4 e5" }).to_string();
        let response = post_json(missing_engine_state(), &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Failed to start engine"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let response = post_json(working_state(), "{\"pgn\": ").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .body(Body::from(r#"{"pgn": "1. e4"}"#))
            .unwrap();
        let response = router(working_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
