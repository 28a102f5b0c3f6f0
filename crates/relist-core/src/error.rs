//! # Error Types
//!
//! Domain-specific error types for relist-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  relist-core errors (this file)                                        │
//! │  ├── CoreError        - Calculation / policy sanity failures           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  relist-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  relist-engine errors                                                  │
//! │  └── EngineError      - Request-level taxonomy with HTTP mapping       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → HTTP response       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, platform, rate)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Calculation-level errors.
///
/// A `PolicyError` means the resolved policy data itself is malformed; the
/// calculation must fail loudly rather than emit a nonsensical result
/// (negative or infinite break-even price).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resolved policy carries values the cost model cannot safely use.
    ///
    /// ## When This Occurs
    /// - Fee rate at or above 100% (break-even denominator <= 0)
    /// - Non-positive FX rate
    /// - Unknown fee-type tag on a fee-rule row
    #[error("Malformed policy: {detail}")]
    PolicyError { detail: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a PolicyError with the given detail.
    pub fn policy(detail: impl Into<String>) -> Self {
        CoreError::PolicyError {
            detail: detail.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced once, before any policy lookup; downstream components operate
/// on the normalized request and never re-validate.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Value must be strictly positive (buy price, sell price).
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must be zero or greater (shipping fee, other cost).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: &'static str },

    /// Quantity must be at least 1.
    #[error("quantity must be at least 1, got {got}")]
    InvalidQuantity { got: i64 },

    /// Value is not finite (NaN or infinity slipped through JSON parsing).
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::policy("fee rate 120% leaves no revenue");
        assert_eq!(
            err.to_string(),
            "Malformed policy: fee rate 120% leaves no revenue"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive { field: "buy_price" };
        assert_eq!(err.to_string(), "buy_price must be positive");

        let err = ValidationError::InvalidQuantity { got: 0 };
        assert_eq!(err.to_string(), "quantity must be at least 1, got 0");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBeNonNegative {
            field: "shipping_fee",
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
