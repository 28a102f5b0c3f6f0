//! HTTP routes and handlers.
//!
//! ## Endpoints
//! - `POST /api/v1/calc` — run a calculation
//! - `GET  /api/v1/results/{id}` — replay a persisted snapshot
//! - `GET  /health` — liveness + database reachability
//!
//! Handlers stay thin: extract identity from headers, call the engine,
//! wrap the outcome in the `{ok, data}` envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use relist_core::{CalcRequest, CalculationResult, RequesterIdentity};

use crate::error::ApiError;
use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/calc", post(calculate))
        .route("/api/v1/results/{id}", get(get_result))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Calculation response payload: the snapshot fields plus persistence info.
#[derive(Debug, Serialize)]
struct CalcResponse {
    #[serde(flatten)]
    result: CalculationResult,

    /// Shareable snapshot ID; absent when persistence was degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    result_id: Option<String>,

    persistence_degraded: bool,
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CalcRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    // A body axum cannot deserialize still gets the error envelope.
    let Json(request) = payload?;
    let identity = identity_from_headers(&headers);

    let outcome = state.engine.calculate(request, identity).await?;

    Ok(envelope(CalcResponse {
        result: outcome.result,
        result_id: outcome.result_id,
        persistence_degraded: outcome.persistence_degraded,
    }))
}

async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state.engine.get_result(&id).await?;
    Ok(envelope(result))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_ok = state.db.health_check().await;
    Json(json!({"ok": true, "data": {"database": db_ok}}))
}

// =============================================================================
// Helpers
// =============================================================================

fn envelope(data: impl Serialize) -> Json<Value> {
    Json(json!({"ok": true, "data": data}))
}

/// Builds the requester identity from proxy headers.
///
/// `x-forwarded-for` may carry a chain; the first entry is the client.
/// A missing or unreadable header degrades to the shared "unknown" identity
/// rather than failing the request.
fn identity_from_headers(headers: &HeaderMap) -> RequesterIdentity {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    RequesterIdentity { ip, user_agent }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("test/1.0"));

        let identity = identity_from_headers(&headers);
        assert_eq!(identity.ip, "203.0.113.7");
        assert_eq!(identity.user_agent.as_deref(), Some("test/1.0"));
    }

    #[test]
    fn test_identity_missing_headers_degrades_to_unknown() {
        let identity = identity_from_headers(&HeaderMap::new());
        assert_eq!(identity.ip, "unknown");
        assert!(identity.user_agent.is_none());
    }

    #[test]
    fn test_identity_empty_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));

        let identity = identity_from_headers(&headers);
        assert_eq!(identity.ip, "unknown");
    }
}
