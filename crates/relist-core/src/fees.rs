//! # Platform Fee Rules
//!
//! Fee calculation is rule-typed, not one formula. A fee rule declares its
//! shape and the engine dispatches on the tagged variant, so a forgotten
//! shape is a compile error, not a silent string mismatch.
//!
//! ## Fee Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FeeKind Dispatch                                 │
//! │                                                                         │
//! │  Percentage          fee = sell × rate                                  │
//! │  Fixed               fee = amount                                       │
//! │  PercentageBounded   fee = clamp(sell × rate, min, max)                 │
//! │  RatePlusMinimum     fee = sell × rate + min        (legacy row shape,  │
//! │                                                      NULL fee_type)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All fee outputs are whole won (half-up rounding happens inside
//! [`Money::apply_rate`]). The per-unit platform shipping charge lives on
//! the schedule and scales with quantity.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::types::Platform;

// =============================================================================
// Fee Kind
// =============================================================================

/// The shape of a platform's sale fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeKind {
    /// Straight percentage of the sale price.
    Percentage { rate: Rate },

    /// Flat fee regardless of sale price.
    Fixed { amount: Money },

    /// Percentage of the sale price, clamped to a floor and cap.
    PercentageBounded {
        rate: Rate,
        min_fee: Money,
        max_fee: Money,
    },

    /// Legacy untagged rule shape: percentage plus the minimum-fee column
    /// added on top. Kept because historical rows predate the fee_type tag.
    RatePlusMinimum { rate: Rate, min_fee: Money },
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// The resolved, currently active fee rule for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub platform: Platform,
    pub kind: FeeKind,

    /// Per-unit charge the platform bills the seller for inbound shipping
    /// (e.g. shipping the item to the marketplace warehouse for inspection).
    pub shipping_fee: Money,

    /// Version tag recorded in the result badges.
    pub version: String,
}

impl FeeSchedule {
    /// Rejects schedules the cost model cannot safely use.
    ///
    /// A variable rate at or above 100% makes the break-even denominator
    /// `1 - rate` zero or negative; failing here keeps an infinite or
    /// negative break-even price from ever reaching a caller.
    pub fn ensure_sane(&self) -> CoreResult<()> {
        let rate = self.variable_rate();
        if rate.is_confiscatory() {
            return Err(CoreError::policy(format!(
                "fee rate {}% on {} is >= 100%",
                rate.percentage(),
                self.platform
            )));
        }

        if let FeeKind::PercentageBounded { min_fee, max_fee, .. } = self.kind {
            if min_fee > max_fee {
                return Err(CoreError::policy(format!(
                    "fee floor {} exceeds cap {} on {}",
                    min_fee, max_fee, self.platform
                )));
            }
        }

        Ok(())
    }

    /// Computes the sale fee for a local-currency sell price.
    pub fn sale_fee(&self, sell_price: Money) -> Money {
        match self.kind {
            FeeKind::Percentage { rate } => sell_price.apply_rate(rate),
            FeeKind::Fixed { amount } => amount,
            FeeKind::PercentageBounded {
                rate,
                min_fee,
                max_fee,
            } => sell_price.apply_rate(rate).clamp(min_fee, max_fee),
            FeeKind::RatePlusMinimum { rate, min_fee } => sell_price.apply_rate(rate) + min_fee,
        }
    }

    /// The variable component of the fee, as used by the break-even solve
    /// `revenue × (1 - rate) = fixed costs`.
    pub fn variable_rate(&self) -> Rate {
        match self.kind {
            FeeKind::Percentage { rate } => rate,
            FeeKind::Fixed { .. } => Rate::zero(),
            // The clamp is ignored for break-even; the solve uses the raw rate.
            FeeKind::PercentageBounded { rate, .. } => rate,
            FeeKind::RatePlusMinimum { rate, .. } => rate,
        }
    }

    /// The fixed component of the fee, counted among break-even fixed costs.
    pub fn fixed_fee_component(&self) -> Money {
        match self.kind {
            FeeKind::Percentage { .. } => Money::zero(),
            FeeKind::Fixed { amount } => amount,
            FeeKind::PercentageBounded { .. } => Money::zero(),
            FeeKind::RatePlusMinimum { min_fee, .. } => min_fee,
        }
    }

    /// Total platform shipping for the given quantity.
    pub fn shipping_total(&self, quantity: i64) -> Money {
        self.shipping_fee.multiply_quantity(quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(kind: FeeKind) -> FeeSchedule {
        FeeSchedule {
            platform: Platform::Kream,
            kind,
            shipping_fee: Money::from_won(3_000),
            version: "v1".to_string(),
        }
    }

    #[test]
    fn test_percentage_fee() {
        let s = schedule(FeeKind::Percentage {
            rate: Rate::from_bps(550),
        });
        assert_eq!(s.sale_fee(Money::from_won(150_000)).won(), 8_250);
        assert_eq!(s.fixed_fee_component(), Money::zero());
    }

    #[test]
    fn test_fixed_fee() {
        let s = schedule(FeeKind::Fixed {
            amount: Money::from_won(5_000),
        });
        assert_eq!(s.sale_fee(Money::from_won(150_000)).won(), 5_000);
        assert_eq!(s.sale_fee(Money::from_won(10)).won(), 5_000);
        assert_eq!(s.variable_rate(), Rate::zero());
    }

    #[test]
    fn test_bounded_fee_clamps() {
        let s = schedule(FeeKind::PercentageBounded {
            rate: Rate::from_bps(1000), // 10%
            min_fee: Money::from_won(2_000),
            max_fee: Money::from_won(10_000),
        });

        // Below floor: 10% of ₩10,000 = ₩1,000 → clamped to ₩2,000
        assert_eq!(s.sale_fee(Money::from_won(10_000)).won(), 2_000);
        // Inside band: 10% of ₩50,000 = ₩5,000
        assert_eq!(s.sale_fee(Money::from_won(50_000)).won(), 5_000);
        // Above cap: 10% of ₩500,000 = ₩50,000 → clamped to ₩10,000
        assert_eq!(s.sale_fee(Money::from_won(500_000)).won(), 10_000);
    }

    #[test]
    fn test_legacy_rate_plus_minimum() {
        let s = schedule(FeeKind::RatePlusMinimum {
            rate: Rate::from_bps(550),
            min_fee: Money::from_won(1_000),
        });
        assert_eq!(s.sale_fee(Money::from_won(150_000)).won(), 9_250);
        assert_eq!(s.fixed_fee_component().won(), 1_000);
    }

    #[test]
    fn test_shipping_scales_with_quantity() {
        let s = schedule(FeeKind::Percentage {
            rate: Rate::from_bps(550),
        });
        assert_eq!(s.shipping_total(1).won(), 3_000);
        assert_eq!(s.shipping_total(3).won(), 9_000);
    }

    #[test]
    fn test_confiscatory_rate_rejected() {
        let s = schedule(FeeKind::Percentage {
            rate: Rate::from_bps(10_000),
        });
        assert!(matches!(
            s.ensure_sane(),
            Err(CoreError::PolicyError { .. })
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let s = schedule(FeeKind::PercentageBounded {
            rate: Rate::from_bps(500),
            min_fee: Money::from_won(10_000),
            max_fee: Money::from_won(1_000),
        });
        assert!(s.ensure_sane().is_err());
    }
}
