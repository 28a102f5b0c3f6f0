//! # Import Tax Evaluation
//!
//! Decides whether the duty-free threshold is crossed and what customs duty
//! and import VAT follow, with human-readable warnings for the requester.
//!
//! ## Threshold Logic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Duty/VAT Decision                                   │
//! │                                                                         │
//! │  tax base (₩) = buy price + international shipping                      │
//! │  tax base ($) = tax base (₩) ÷ fx rate                                  │
//! │                                                                         │
//! │  effective threshold = duty-free limit                                  │
//! │                        × conservative multiplier  (risk flag only)      │
//! │                                                                         │
//! │  tax base ($) > effective threshold?                                    │
//! │    YES → duty = tax base × duty rate                                    │
//! │          vat  = (tax base + duty) × vat rate   ← duty-inclusive base    │
//! │          warning naming the crossed threshold                           │
//! │    NO  → duty = vat = 0                                                 │
//! │          risk flag set? → informational warning, no tax                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! VAT on the duty-inclusive base matches Korean import-VAT convention.
//! The conservative multiplier models customs aggregating multiple
//! same-day shipments into one taxable entry.

use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};
use crate::types::FxRate;

// =============================================================================
// Import Tax Policy
// =============================================================================

/// The resolved, currently active import-tax policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportTaxPolicy {
    pub duty_rate: Rate,
    pub vat_rate: Rate,

    /// Duty-free threshold in foreign-currency units (USD).
    pub duty_free_limit: f64,

    /// Threshold multiplier applied when the caller flags combined-tax
    /// risk. Below 1.0 the policy is conservative: the effective threshold
    /// shrinks and tax triggers earlier.
    pub combined_risk_multiplier: f64,

    /// Logical policy key ("kr_import"), recorded in the result badges.
    pub policy_key: String,

    pub version: String,
}

impl ImportTaxPolicy {
    /// The built-in conservative default used when no active tax policy row
    /// exists. Tax policy absence degrades gracefully: it is a compliance
    /// aid, not the primary commercial outcome.
    pub fn fallback() -> Self {
        ImportTaxPolicy {
            duty_rate: Rate::from_bps(1_300),  // 13%
            vat_rate: Rate::from_bps(1_000),   // 10%
            duty_free_limit: 150.0,
            combined_risk_multiplier: 1.0,
            policy_key: "default_fallback".to_string(),
            version: "v0".to_string(),
        }
    }

    /// The threshold actually compared against, given the risk flag.
    pub fn effective_limit(&self, combined_risk: bool) -> f64 {
        if combined_risk {
            self.duty_free_limit * self.combined_risk_multiplier
        } else {
            self.duty_free_limit
        }
    }

    /// Evaluates duty and VAT for a local-currency tax base.
    ///
    /// Distinguishes "taxed" from "warned-but-not-taxed": a risk-flagged
    /// request that stays under the threshold gets an informational warning
    /// and zero tax.
    pub fn assess(&self, tax_base: Money, fx: &FxRate, combined_risk: bool) -> TaxAssessment {
        let tax_base_foreign = fx.to_foreign(tax_base);
        let effective_limit = self.effective_limit(combined_risk);

        if tax_base_foreign > effective_limit {
            let customs_duty = tax_base.apply_rate(self.duty_rate);
            let vat = (tax_base + customs_duty).apply_rate(self.vat_rate);

            let warning = format!(
                "Tax base ${:.2} exceeds the duty-free threshold (${:.2}); \
                 customs duty and import VAT were applied.",
                tax_base_foreign, effective_limit
            );

            return TaxAssessment {
                customs_duty,
                vat,
                taxed: true,
                warnings: vec![warning],
            };
        }

        let warnings = if combined_risk {
            vec![
                "Combined-tax risk: shipments clearing customs on the same day may be \
                 aggregated and taxed as one entry."
                    .to_string(),
            ]
        } else {
            Vec::new()
        };

        TaxAssessment {
            customs_duty: Money::zero(),
            vat: Money::zero(),
            taxed: false,
            warnings,
        }
    }
}

// =============================================================================
// Tax Assessment
// =============================================================================

/// Outcome of the threshold evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxAssessment {
    pub customs_duty: Money,
    pub vat: Money,

    /// True iff the threshold was actually crossed and tax applied.
    pub taxed: bool,

    pub warnings: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fx(rate: f64) -> FxRate {
        FxRate {
            rate,
            provider: "customs_service".to_string(),
            base_time: Utc::now(),
        }
    }

    fn policy() -> ImportTaxPolicy {
        ImportTaxPolicy::fallback()
    }

    #[test]
    fn test_below_threshold_no_tax() {
        // ₩150,000 at 1350 = $111.1 < $150
        let assessment = policy().assess(Money::from_won(150_000), &fx(1350.0), false);
        assert!(!assessment.taxed);
        assert_eq!(assessment.customs_duty, Money::zero());
        assert_eq!(assessment.vat, Money::zero());
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn test_above_threshold_duty_and_vat() {
        // ₩250,000 at 1350 = $185.19 > $150
        let assessment = policy().assess(Money::from_won(250_000), &fx(1350.0), false);
        assert!(assessment.taxed);
        assert_eq!(assessment.customs_duty.won(), 32_500); // 13%
        assert_eq!(assessment.vat.won(), 28_250); // 10% of duty-inclusive base
        assert_eq!(assessment.warnings.len(), 1);
        assert!(assessment.warnings[0].contains("duty-free threshold"));
    }

    #[test]
    fn test_risk_flag_warns_without_taxing() {
        // $140 equivalent, multiplier 1.0 → under threshold, warned only
        let assessment = policy().assess(Money::from_won(189_000), &fx(1350.0), true);
        assert!(!assessment.taxed);
        assert_eq!(assessment.customs_duty, Money::zero());
        assert_eq!(assessment.warnings.len(), 1);
        assert!(assessment.warnings[0].contains("Combined-tax risk"));
    }

    #[test]
    fn test_conservative_multiplier_shrinks_threshold() {
        let mut policy = policy();
        policy.combined_risk_multiplier = 0.8; // effective $120

        // $140 equivalent crosses the shrunken threshold when flagged
        let base = Money::from_won(189_000); // $140 at 1350
        let flagged = policy.assess(base, &fx(1350.0), true);
        assert!(flagged.taxed);

        // ... but not when unflagged
        let unflagged = policy.assess(base, &fx(1350.0), false);
        assert!(!unflagged.taxed);
    }

    #[test]
    fn test_exactly_at_threshold_not_taxed() {
        // Threshold is exclusive: base must *exceed* the limit
        let assessment = policy().assess(Money::from_won(202_500), &fx(1350.0), false); // $150.00
        assert!(!assessment.taxed);
    }
}
