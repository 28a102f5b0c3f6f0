//! # Cost Model
//!
//! The deterministic core: normalized request + resolved policies in,
//! breakdown and outcome out. No I/O, no clock, no randomness — two calls
//! with identical inputs produce identical numbers.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cost Model                                       │
//! │                                                                         │
//! │  NormalizedRequest ──► sell-side FX normalization (₩, whole won)        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  FeeSchedule ──► platform fee + platform shipping                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ImportTaxPolicy ──► duty / VAT / warnings (tax.rs)                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  total cost ──► profit ──► margin ──► break-even                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::fees::FeeSchedule;
use crate::money::Money;
use crate::tax::ImportTaxPolicy;
use crate::types::{CostBreakdown, Currency, FxRate, Outcome};
use crate::validation::NormalizedRequest;

// =============================================================================
// Evaluation
// =============================================================================

/// Everything the cost model produces for one request. The assembler wraps
/// this with meta and badges to form the persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub breakdown: CostBreakdown,
    pub outcome: Outcome,
    pub warnings: Vec<String>,
}

/// Runs the full cost/tax/fee model.
///
/// ## Normalization
/// A foreign sell price is converted at the resolved FX rate and rounded to
/// the nearest whole won; a local sell price passes through. The buy side is
/// local currency by input contract (see [`NormalizedRequest`]).
///
/// ## Errors
/// `PolicyError` when the fee schedule or FX rate is malformed; nothing is
/// computed from bad policy data.
pub fn evaluate(
    req: &NormalizedRequest,
    fx: &FxRate,
    fees: &FeeSchedule,
    tax: &ImportTaxPolicy,
) -> CoreResult<Evaluation> {
    if !(fx.rate.is_finite() && fx.rate > 0.0) {
        return Err(CoreError::policy(format!(
            "exchange rate {} is not usable",
            fx.rate
        )));
    }
    fees.ensure_sane()?;

    // Sell-side normalization: the only FX conversion into money.
    let gross_revenue = match req.sell_currency {
        Currency::Local => Money::from_f64_rounded(req.sell_price),
        Currency::Foreign => fx.to_local(req.sell_price),
    };

    let platform_fee = fees.sale_fee(gross_revenue);
    let platform_shipping_fee = fees.shipping_total(req.quantity);

    // Tax base: item cost + international shipping, per customs convention.
    let tax_base = req.buy_price + req.shipping;
    let assessment = tax.assess(tax_base, fx, req.combined_tax_risk);

    let total_cost = req.buy_price
        + req.shipping
        + req.other_cost
        + assessment.customs_duty
        + assessment.vat
        + platform_fee
        + platform_shipping_fee;

    let profit = gross_revenue - total_cost;

    let margin_rate = if gross_revenue.is_positive() {
        round2(profit.as_f64() / gross_revenue.as_f64() * 100.0)
    } else {
        0.0
    };

    // Break-even solves revenue × (1 - variable rate) = fixed costs.
    // ensure_sane() already rejected rates >= 100%, so the denominator is
    // strictly positive here.
    let fixed_costs = req.buy_price
        + req.shipping
        + req.other_cost
        + assessment.customs_duty
        + assessment.vat
        + fees.fixed_fee_component()
        + platform_shipping_fee;
    let denominator = 1.0 - fees.variable_rate().fraction();
    let break_even_price = Money::from_f64_floored(fixed_costs.as_f64() / denominator);

    Ok(Evaluation {
        breakdown: CostBreakdown {
            buy_price: req.buy_price,
            intl_shipping: req.shipping,
            customs_duty: assessment.customs_duty,
            vat: assessment.vat,
            platform_fee,
            platform_shipping_fee,
            other_cost: req.other_cost,
            total_cost,
            gross_revenue,
        },
        outcome: Outcome {
            profit,
            margin_rate,
            break_even_price,
            is_loss: profit.is_negative(),
        },
        warnings: assessment.warnings,
    })
}

/// Rounds to two decimal places (margin rate display precision).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
