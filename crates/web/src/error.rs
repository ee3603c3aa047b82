use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<chess_review_core::Error> for ApiError {
    fn from(error: chess_review_core::Error) -> Self {
        use chess_review_core::Error;

        match error {
            Error::InvalidInput(_) | Error::EngineUnavailable(_) => ApiError::BadRequest(error.to_string()),
            Error::Unexpected(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::debug!("Rejected request: {msg}");
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_review_core::{EngineError, Error};

    #[test]
    fn test_core_errors_map_to_status() {
        let cases = [
            (Error::InvalidInput("Invalid PGN".into()), StatusCode::BAD_REQUEST),
            (Error::EngineUnavailable(EngineError::Terminated), StatusCode::BAD_REQUEST),
            (Error::Unexpected("Analysis task failed".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
