//! # Input Validation
//!
//! The validate step of the request pipeline: raw wire request in,
//! normalized request out.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON deserialization (serde)                                 │
//! │  ├── Unknown platform / currency tags rejected here                    │
//! │  └── Type errors rejected here                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - value checks                                   │
//! │  ├── Prices strictly positive                                          │
//! │  ├── Optional costs non-negative, defaulted                            │
//! │  └── Quantity >= 1, defaulted to 1                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Downstream components consume NormalizedRequest and never re-validate │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CalcRequest, Currency, Platform};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Normalized Request
// =============================================================================

/// A request that passed validation, with defaults applied.
///
/// ## Normalization contract (deliberate asymmetry)
/// The buy side (`buy_price`, `shipping`, `other_cost`) is already local
/// currency by the caller's input contract. Only the sell side may be
/// foreign and is converted by the engine at the resolved FX rate. We keep
/// this asymmetry from the observed product behavior rather than invent a
/// symmetric contract the clients don't follow.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub platform: Platform,
    pub buy_price: Money,
    /// Sell price still in `sell_currency` units; converted in costing.
    pub sell_price: f64,
    pub sell_currency: Currency,
    pub shipping: Money,
    pub other_cost: Money,
    pub combined_tax_risk: bool,
    pub quantity: i64,
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a raw request and produces the normalized form.
///
/// ## Contract
/// Rejects when buy price <= 0, sell price <= 0, an optional cost is
/// negative, or quantity < 1. Platform and currency membership are enforced
/// by the closed enums at deserialization time.
///
/// ## Example
/// ```rust
/// use relist_core::types::{CalcRequest, Currency, Platform};
/// use relist_core::validation::validate;
///
/// let req = CalcRequest {
///     platform: Platform::Kream,
///     buy_price_local: 100_000,
///     sell_price: 150_000.0,
///     sell_currency: Currency::Local,
///     shipping_fee: None,
///     other_cost: None,
///     is_combined_tax_risk: None,
///     quantity: None,
/// };
/// let normalized = validate(&req).unwrap();
/// assert_eq!(normalized.quantity, 1);
/// ```
pub fn validate(req: &CalcRequest) -> ValidationResult<NormalizedRequest> {
    if req.buy_price_local <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "buy_price_local",
        });
    }

    if !req.sell_price.is_finite() {
        return Err(ValidationError::NotFinite { field: "sell_price" });
    }

    if req.sell_price <= 0.0 {
        return Err(ValidationError::MustBePositive { field: "sell_price" });
    }

    let shipping = req.shipping_fee.unwrap_or(0);
    if shipping < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "shipping_fee",
        });
    }

    let other_cost = req.other_cost.unwrap_or(0);
    if other_cost < 0 {
        return Err(ValidationError::MustBeNonNegative { field: "other_cost" });
    }

    let quantity = req.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ValidationError::InvalidQuantity { got: quantity });
    }

    Ok(NormalizedRequest {
        platform: req.platform,
        buy_price: Money::from_won(req.buy_price_local),
        sell_price: req.sell_price,
        sell_currency: req.sell_currency,
        shipping: Money::from_won(shipping),
        other_cost: Money::from_won(other_cost),
        combined_tax_risk: req.is_combined_tax_risk.unwrap_or(false),
        quantity,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CalcRequest {
        CalcRequest {
            platform: Platform::Kream,
            buy_price_local: 100_000,
            sell_price: 150_000.0,
            sell_currency: Currency::Local,
            shipping_fee: None,
            other_cost: None,
            is_combined_tax_risk: None,
            quantity: None,
        }
    }

    #[test]
    fn test_valid_request_applies_defaults() {
        let normalized = validate(&base_request()).unwrap();
        assert_eq!(normalized.buy_price.won(), 100_000);
        assert_eq!(normalized.shipping.won(), 0);
        assert_eq!(normalized.other_cost.won(), 0);
        assert_eq!(normalized.quantity, 1);
        assert!(!normalized.combined_tax_risk);
    }

    #[test]
    fn test_rejects_non_positive_buy_price() {
        let mut req = base_request();
        req.buy_price_local = 0;
        assert!(matches!(
            validate(&req),
            Err(ValidationError::MustBePositive {
                field: "buy_price_local"
            })
        ));

        req.buy_price_local = -5;
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_rejects_non_positive_sell_price() {
        let mut req = base_request();
        req.sell_price = 0.0;
        assert!(matches!(
            validate(&req),
            Err(ValidationError::MustBePositive {
                field: "sell_price"
            })
        ));
    }

    #[test]
    fn test_rejects_nan_sell_price() {
        let mut req = base_request();
        req.sell_price = f64::NAN;
        assert!(matches!(
            validate(&req),
            Err(ValidationError::NotFinite { field: "sell_price" })
        ));
    }

    #[test]
    fn test_rejects_negative_costs() {
        let mut req = base_request();
        req.shipping_fee = Some(-1);
        assert!(validate(&req).is_err());

        let mut req = base_request();
        req.other_cost = Some(-100);
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let mut req = base_request();
        req.quantity = Some(0);
        assert!(matches!(
            validate(&req),
            Err(ValidationError::InvalidQuantity { got: 0 })
        ));
    }
}
