use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::{ChessError, MoveError};

/// Structured API error that serializes to JSON.
#[derive(Debug)]
pub enum ApiError {
    /// A move-text token failed; `index` counts SAN tokens from 0.
    InvalidMove {
        index: usize,
        token: String,
        source: MoveError,
    },
    InvalidFen(ChessError),
    GameTooShort(ChessError),
    InvalidRequest(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut index = None;
        let mut token = None;
        let (status, code, message) = match self {
            ApiError::InvalidMove {
                index: i,
                token: t,
                source,
            } => {
                let status = match source {
                    MoveError::InconsistentState(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_REQUEST,
                };
                let message = format!("move {i} ('{t}'): {source}");
                index = Some(i);
                token = Some(t);
                (status, source.code(), message)
            }
            ApiError::InvalidFen(err) => (StatusCode::BAD_REQUEST, "INVALID_FEN", err.to_string()),
            ApiError::GameTooShort(err) => {
                (StatusCode::BAD_REQUEST, "GAME_TOO_SHORT", err.to_string())
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                index,
                token,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChessError> for ApiError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::Replay {
                index,
                token,
                source,
            } => ApiError::InvalidMove {
                index,
                token,
                source,
            },
            ChessError::InvalidFen(_) => ApiError::InvalidFen(err),
            ChessError::GameTooShort { .. } => ApiError::GameTooShort(err),
            ChessError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
        }
    }
}
