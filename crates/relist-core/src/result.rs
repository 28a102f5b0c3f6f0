//! # Result Assembly
//!
//! Packages the cost-model output with resolution metadata into the
//! immutable snapshot that gets persisted and returned.
//!
//! The badges record exactly which FX provider/date, fee-rule version and
//! tax-policy key produced the numbers, so a disputed result can be
//! replayed against the policy history ("why did I get this number").

use chrono::{DateTime, Utc};

use crate::costing::Evaluation;
use crate::fees::FeeSchedule;
use crate::tax::ImportTaxPolicy;
use crate::types::{CalculationResult, FxRate, PolicyBadges, ResultMeta};

/// Currency code for every monetary field in a result.
pub const RESULT_CURRENCY: &str = "KRW";

/// Assembles the persistable snapshot.
///
/// `computed_at` is passed in rather than read from a clock so assembly
/// stays pure; the engine supplies it once per request.
pub fn assemble(
    evaluation: Evaluation,
    fx: &FxRate,
    fees: &FeeSchedule,
    tax: &ImportTaxPolicy,
    computed_at: DateTime<Utc>,
) -> CalculationResult {
    CalculationResult {
        meta: ResultMeta {
            currency: RESULT_CURRENCY.to_string(),
            timestamp: computed_at,
            fx_rate: fx.rate,
        },
        breakdown: evaluation.breakdown,
        outcome: evaluation.outcome,
        badges: PolicyBadges {
            fx_provider: fx.provider.clone(),
            fx_date: fx.base_date(),
            policy_ver: fees.version.clone(),
            tax_rule: tax.policy_key.clone(),
        },
        warnings: evaluation.warnings,
    }
}
