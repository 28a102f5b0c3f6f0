//! # Domain Types
//!
//! Core domain types for the resale profit calculator.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CalcRequest    │   │     FxRate      │   │CalculationResult│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  platform       │   │  rate (f64)     │   │  meta           │       │
//! │  │  buy_price_local│   │  provider       │   │  breakdown      │       │
//! │  │  sell_price     │   │  base_time      │   │  outcome        │       │
//! │  │  sell_currency  │   └─────────────────┘   │  badges         │       │
//! │  └─────────────────┘                         │  warnings       │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Platform     │   │    Currency     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Kream          │   │  Local  (KRW)   │                             │
//! │  │  Stockx         │   │  Foreign (USD)  │                             │
//! │  │  Soldout        │   └─────────────────┘                             │
//! │  │  Smartstore     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Currency tags on the wire are `"LOCAL"`/`"FOREIGN"`; in this deployment
//! local is KRW and foreign is USD.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Platform
// =============================================================================

/// A supported resale marketplace.
///
/// The closed set doubles as platform validation: a request naming anything
/// else fails JSON deserialization before it reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Kream,
    Stockx,
    Soldout,
    Smartstore,
}

impl Platform {
    /// Stable lowercase tag used in database rows and log payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Kream => "kream",
            Platform::Stockx => "stockx",
            Platform::Soldout => "soldout",
            Platform::Smartstore => "smartstore",
        }
    }

    /// Parses the database tag back into the enum.
    pub fn parse(tag: &str) -> Option<Platform> {
        match tag {
            "kream" => Some(Platform::Kream),
            "stockx" => Some(Platform::Stockx),
            "soldout" => Some(Platform::Soldout),
            "smartstore" => Some(Platform::Smartstore),
            _ => None,
        }
    }

    /// All supported platforms, for seeding and diagnostics.
    pub const ALL: [Platform; 4] = [
        Platform::Kream,
        Platform::Stockx,
        Platform::Soldout,
        Platform::Smartstore,
    ];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Currency tag for the sell price.
///
/// The buy side is always local currency by input contract (the caller
/// pre-converts); only the sell side may arrive in foreign currency and be
/// normalized by the engine. This asymmetry is deliberate and documented on
/// [`crate::validation::NormalizedRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    /// KRW - whole-won amounts.
    Local,
    /// USD - fractional amounts, converted at the resolved FX rate.
    Foreign,
}

// =============================================================================
// Calculation Request (wire)
// =============================================================================

/// An incoming calculation request, exactly as posted by the client.
///
/// ```json
/// {
///   "platform": "kream",
///   "buy_price_local": 100000,
///   "sell_price": 150000,
///   "sell_currency": "LOCAL",
///   "shipping_fee": 0,
///   "is_combined_tax_risk": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalcRequest {
    /// Marketplace the item will be sold on.
    pub platform: Platform,

    /// Purchase price, already converted to local currency by the caller.
    pub buy_price_local: i64,

    /// Sell price in `sell_currency` units. Fractional when foreign.
    pub sell_price: f64,

    /// Currency of `sell_price`.
    pub sell_currency: Currency,

    /// International shipping cost in local currency.
    #[serde(default)]
    pub shipping_fee: Option<i64>,

    /// Any other cost in local currency (insurance, repackaging, ...).
    #[serde(default)]
    pub other_cost: Option<i64>,

    /// Caller-asserted flag: other shipments may arrive the same day and be
    /// aggregated by customs into one taxable entry.
    #[serde(default)]
    pub is_combined_tax_risk: Option<bool>,

    /// Number of units; scales the per-unit platform shipping charge.
    #[serde(default)]
    pub quantity: Option<i64>,
}

// =============================================================================
// Requester Identity
// =============================================================================

/// Who sent the request, for rate limiting and the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequesterIdentity {
    /// Client IP address, or "unknown" when the proxy header is missing.
    pub ip: String,

    /// Raw User-Agent header, if any.
    pub user_agent: Option<String>,
}

impl RequesterIdentity {
    /// Identity for requests whose origin could not be determined.
    pub fn unknown() -> Self {
        RequesterIdentity {
            ip: "unknown".to_string(),
            user_agent: None,
        }
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// A resolved USD→KRW exchange rate.
///
/// Only the most recently timestamped row for the pair is authoritative;
/// the resolver hands the winner to the calculation as this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    /// Won per one unit of foreign currency (e.g. 1350.5).
    pub rate: f64,

    /// Where the rate came from (e.g. "customs_service").
    pub provider: String,

    /// Calendar day the rate applies to.
    pub base_time: DateTime<Utc>,
}

impl FxRate {
    /// Converts a foreign-currency amount to local money, rounded to the
    /// nearest whole won.
    pub fn to_local(&self, foreign: f64) -> Money {
        Money::from_f64_rounded(foreign * self.rate)
    }

    /// Converts local money to fractional foreign-currency units.
    ///
    /// Used only for threshold comparison, never fed back into Money.
    pub fn to_foreign(&self, local: Money) -> f64 {
        local.as_f64() / self.rate
    }

    /// The calendar-day badge shown in result provenance.
    pub fn base_date(&self) -> String {
        self.base_time.format("%Y-%m-%d").to_string()
    }
}

// =============================================================================
// Calculation Result (snapshot)
// =============================================================================

/// Result metadata: which currency the breakdown is in, when it was
/// computed, and at what FX rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultMeta {
    /// Currency code for every breakdown amount ("KRW").
    pub currency: String,

    /// When the calculation ran.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Resolved FX rate used for normalization and the tax base.
    pub fx_rate: f64,
}

/// Cost breakdown in local currency. Every term is non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub buy_price: Money,
    pub intl_shipping: Money,
    pub customs_duty: Money,
    pub vat: Money,
    pub platform_fee: Money,
    pub platform_shipping_fee: Money,
    pub other_cost: Money,
    pub total_cost: Money,
    pub gross_revenue: Money,
}

/// Commercial outcome derived from the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Outcome {
    /// Signed: negative when the resale loses money.
    pub profit: Money,

    /// Profit as a percentage of gross revenue, two decimals;
    /// 0 when gross revenue is 0.
    pub margin_rate: f64,

    /// Minimum sell price at which profit reaches zero.
    pub break_even_price: Money,

    pub is_loss: bool,
}

/// Provenance badges: exactly which policy versions produced this result.
///
/// Required for later dispute resolution ("why did I get this number").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PolicyBadges {
    pub fx_provider: String,
    pub fx_date: String,
    pub policy_ver: String,
    pub tax_rule: String,
}

/// The immutable, persisted calculation snapshot.
///
/// Never mutated after creation; the snapshot row in `calc_results` stores
/// this payload verbatim so a shared result link always replays the exact
/// numbers the requester saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationResult {
    pub meta: ResultMeta,
    pub breakdown: CostBreakdown,
    pub outcome: Outcome,
    pub badges: PolicyBadges,
    pub warnings: Vec<String>,
}

// =============================================================================
// Calculation Log
// =============================================================================

/// Append-only audit row written before the result snapshot.
///
/// One log row always precedes and 1:1-links to one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationLog {
    pub platform: Platform,
    pub ip_address: String,
    pub user_agent: Option<String>,
    /// Raw request payload as received.
    pub input: CalcRequest,
    /// Coarse outcome for quick aggregation; full numbers live in the snapshot.
    pub profit: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tags_roundtrip() {
        for platform in Platform::ALL {
            assert_eq!(Platform::parse(platform.as_str()), Some(platform));
        }
        assert_eq!(Platform::parse("ebay"), None);
    }

    #[test]
    fn test_platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Kream).unwrap();
        assert_eq!(json, r#""kream""#);

        let parsed: Platform = serde_json::from_str(r#""smartstore""#).unwrap();
        assert_eq!(parsed, Platform::Smartstore);
    }

    #[test]
    fn test_currency_serde_tags() {
        assert_eq!(
            serde_json::to_string(&Currency::Foreign).unwrap(),
            r#""FOREIGN""#
        );
        let parsed: Currency = serde_json::from_str(r#""LOCAL""#).unwrap();
        assert_eq!(parsed, Currency::Local);
    }

    #[test]
    fn test_fx_conversions() {
        let fx = FxRate {
            rate: 1350.0,
            provider: "customs_service".to_string(),
            base_time: Utc::now(),
        };

        // $110.50 → ₩149,175
        assert_eq!(fx.to_local(110.5).won(), 149_175);

        // ₩250,000 → ~$185.19
        let usd = fx.to_foreign(Money::from_won(250_000));
        assert!((usd - 185.185).abs() < 0.001);
    }

    #[test]
    fn test_request_optional_fields_default() {
        let json = r#"{
            "platform": "kream",
            "buy_price_local": 100000,
            "sell_price": 150000,
            "sell_currency": "LOCAL"
        }"#;
        let req: CalcRequest = serde_json::from_str(json).unwrap();
        assert!(req.shipping_fee.is_none());
        assert!(req.quantity.is_none());
        assert!(req.is_combined_tax_risk.is_none());
    }
}
