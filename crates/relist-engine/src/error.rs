//! # Engine Error Types
//!
//! The request-level error taxonomy. Every failure a calculation request can
//! hit maps to exactly one variant, and every variant knows its wire code,
//! HTTP status, and the split between what the requester sees and what goes
//! in logs and dev payloads.
//!
//! ## Mapping
//! ```text
//! ┌────────────────────┬────────┬──────────────────────────────────────────┐
//! │ Variant            │ Status │ Meaning                                  │
//! ├────────────────────┼────────┼──────────────────────────────────────────┤
//! │ InvalidInput       │  400   │ Request failed validation                │
//! │ Unauthorized       │  401   │ Missing/wrong access token               │
//! │ ResultNotFound     │  404   │ No snapshot with that ID                 │
//! │ RateLimitExceeded  │  429   │ Sliding window ceiling reached           │
//! │ PolicyNotFound     │  502   │ No active fee rule for the platform      │
//! │ RateUnavailable    │  503   │ No usable exchange rate                  │
//! │ PolicyError        │  500   │ Active policy row is malformed           │
//! │ Internal           │  500   │ Everything else                          │
//! └────────────────────┴────────┴──────────────────────────────────────────┘
//! ```
//!
//! PolicyNotFound is deliberately 502, not 404: the request was fine, the
//! upstream configuration this service depends on is what's missing.

use thiserror::Error;

use relist_core::{CoreError, Platform, ValidationError};
use relist_db::DbError;

/// Request pipeline errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Caller did not present a valid access token.
    #[error("Unauthorized")]
    Unauthorized,

    /// No persisted snapshot with the requested ID.
    #[error("Result not found: {id}")]
    ResultNotFound { id: String },

    /// The requester hit the sliding-window ceiling.
    #[error("Rate limit exceeded: {ceiling} requests per {window_secs}s")]
    RateLimitExceeded { ceiling: u32, window_secs: u64 },

    /// No active fee rule configured for the platform.
    #[error("No active fee policy for platform '{platform}'")]
    PolicyNotFound { platform: Platform },

    /// No usable exchange rate (missing row or failed lookup).
    #[error("Exchange rate unavailable: {detail}")]
    RateUnavailable { detail: String },

    /// An active policy row exists but cannot be used.
    #[error("Policy error: {detail}")]
    PolicyError { detail: String },

    /// Unexpected internal failure.
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl EngineError {
    /// Stable machine-readable error code for the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::Unauthorized => "UNAUTHORIZED",
            EngineError::ResultNotFound { .. } => "RESULT_NOT_FOUND",
            EngineError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            EngineError::PolicyNotFound { .. } => "POLICY_NOT_FOUND",
            EngineError::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            EngineError::PolicyError { .. } => "POLICY_ERROR",
            EngineError::Internal { .. } => "INTERNAL",
        }
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            EngineError::InvalidInput { .. } => 400,
            EngineError::Unauthorized => 401,
            EngineError::ResultNotFound { .. } => 404,
            EngineError::RateLimitExceeded { .. } => 429,
            EngineError::PolicyNotFound { .. } => 502,
            EngineError::RateUnavailable { .. } => 503,
            EngineError::PolicyError { .. } | EngineError::Internal { .. } => 500,
        }
    }

    /// The message shown to the requester. Internal detail stays out of it;
    /// the full story goes to [`EngineError::dev_message`] and logs.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::InvalidInput { message } => message.clone(),
            EngineError::Unauthorized => "Authentication required.".to_string(),
            EngineError::ResultNotFound { .. } => {
                "No saved result with that ID.".to_string()
            }
            EngineError::RateLimitExceeded { .. } => {
                "Too many calculations. Please wait a minute and try again.".to_string()
            }
            EngineError::PolicyNotFound { platform } => {
                format!("Fee policy for '{platform}' is not configured yet.")
            }
            EngineError::RateUnavailable { .. } => {
                "Exchange rate is temporarily unavailable. Please try again shortly.".to_string()
            }
            EngineError::PolicyError { .. } | EngineError::Internal { .. } => {
                "Something went wrong on our side. Please try again.".to_string()
            }
        }
    }

    /// The full diagnostic message, for logs and the dev field of the
    /// error envelope.
    pub fn dev_message(&self) -> String {
        self.to_string()
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        EngineError::Internal {
            detail: detail.into(),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::InvalidInput {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),
            CoreError::PolicyError { detail } => EngineError::PolicyError { detail },
        }
    }
}

/// Database failures outside the policy-resolution path (which applies its
/// own per-lookup semantics) are internal errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        EngineError::internal(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(EngineError, u16, &str)> = vec![
            (
                EngineError::InvalidInput {
                    message: "x".into(),
                },
                400,
                "INVALID_INPUT",
            ),
            (EngineError::Unauthorized, 401, "UNAUTHORIZED"),
            (
                EngineError::ResultNotFound { id: "x".into() },
                404,
                "RESULT_NOT_FOUND",
            ),
            (
                EngineError::RateLimitExceeded {
                    ceiling: 10,
                    window_secs: 60,
                },
                429,
                "RATE_LIMIT_EXCEEDED",
            ),
            (
                EngineError::PolicyNotFound {
                    platform: Platform::Kream,
                },
                502,
                "POLICY_NOT_FOUND",
            ),
            (
                EngineError::RateUnavailable { detail: "x".into() },
                503,
                "RATE_UNAVAILABLE",
            ),
            (
                EngineError::PolicyError { detail: "x".into() },
                500,
                "POLICY_ERROR",
            ),
            (EngineError::internal("x"), 500, "INTERNAL"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.http_status(), status, "{err}");
            assert_eq!(err.code(), code, "{err}");
        }
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = EngineError::internal("sqlite disk I/O error at offset 4096");
        assert!(!err.user_message().contains("sqlite"));
        assert!(err.dev_message().contains("sqlite"));
    }
}
