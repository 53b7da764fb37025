use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use pawtale_engine::GameError;

/// Error body: `{ success: false, error: { code, message } }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_PARAMS", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        let message = e.to_string();
        match e {
            GameError::InvalidSession(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_SESSION", message)
            }
            GameError::SessionNotFound(_) => Self::not_found(message),
            GameError::AlreadySetUp(_) => Self::new(StatusCode::CONFLICT, "ALREADY_SET_UP", message),
            GameError::Identity(_) | GameError::UnknownSpecies(_) => Self::invalid_params(message),
            GameError::NoPendingEvent => {
                Self::new(StatusCode::CONFLICT, "NO_PENDING_EVENT", message)
            }
            GameError::NarrationDisabled => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "NARRATION_DISABLED",
                message,
            ),
            GameError::Store(_) => {
                tracing::error!(error = %message, "store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": ErrorBody {
                code: self.code,
                message: &self.message,
            },
        });
        (self.status, Json(body)).into_response()
    }
}
