//! Error responses for the API.
//!
//! Every failure becomes the same envelope shape:
//! `{ok: false, error: {code, message, dev}}` with the status code the
//! engine taxonomy assigns. `message` is user-safe; `dev` carries the
//! diagnostic detail.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use relist_engine::EngineError;

/// Wrapper making [`EngineError`] an axum response.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

/// Body parse failures (malformed JSON, unknown platform/currency tags)
/// are input errors too; they get the same 400 envelope as field
/// validation instead of axum's plain-text 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(EngineError::InvalidInput {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = json!({
            "ok": false,
            "error": {
                "code": self.0.code(),
                "message": self.0.user_message(),
                "dev": self.0.dev_message(),
            }
        });

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
