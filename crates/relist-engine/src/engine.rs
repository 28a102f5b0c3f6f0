//! # Calculation Engine
//!
//! The per-request pipeline, in fixed order.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              calculate(request, identity)                               │
//! │                                                                         │
//! │  1. rate limit check        ← before ANY policy lookup                  │
//! │  2. validate + normalize    ← relist-core                               │
//! │  3. resolve policies        ← 3-way concurrent fan-out                  │
//! │  4. evaluate + assemble     ← relist-core (pure)                        │
//! │  5. persist log + snapshot  ← best-effort                               │
//! │                                                                         │
//! │  Step 5 failure does not fail the request: the requester gets the      │
//! │  result with persistence_degraded = true and no shareable ID.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use relist_core::{
    costing, result, validate, CalcRequest, CalculationLog, CalculationResult, RequesterIdentity,
};

use crate::error::{EngineError, EngineResult};
use crate::limiter::{RateLimiter, RequestCounter, DEFAULT_CEILING, DEFAULT_WINDOW_SECS};
use crate::persist::PersistenceGateway;
use crate::policy::{self, PolicySource};

// =============================================================================
// Configuration
// =============================================================================

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,

    /// Per-IP request ceiling inside the window.
    pub rate_limit_ceiling: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rate_limit_window_secs: DEFAULT_WINDOW_SECS,
            rate_limit_ceiling: DEFAULT_CEILING,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// What a successful calculation hands back to the API layer.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    /// The assembled snapshot (also what was persisted, verbatim).
    pub result: CalculationResult,

    /// Shareable snapshot ID; `None` when persistence was degraded.
    pub result_id: Option<String>,

    /// True when the result could not be persisted.
    pub persistence_degraded: bool,
}

/// The calculation engine. Cheap to clone via shared seams.
pub struct CalculationEngine {
    policies: Arc<dyn PolicySource>,
    limiter: RateLimiter,
    gateway: Arc<dyn PersistenceGateway>,
}

impl CalculationEngine {
    pub fn new(
        policies: Arc<dyn PolicySource>,
        counter: Arc<dyn RequestCounter>,
        gateway: Arc<dyn PersistenceGateway>,
        config: EngineConfig,
    ) -> Self {
        CalculationEngine {
            policies,
            limiter: RateLimiter::new(
                counter,
                config.rate_limit_window_secs,
                config.rate_limit_ceiling,
            ),
            gateway,
        }
    }

    /// Runs one calculation end to end.
    pub async fn calculate(
        &self,
        request: CalcRequest,
        identity: RequesterIdentity,
    ) -> EngineResult<EngineOutcome> {
        // Admission first: a rejected request must not touch policy stores.
        self.limiter.check(&identity).await?;

        let normalized = validate(&request).map_err(EngineError::from)?;

        let resolved = policy::resolve(self.policies.as_ref(), request.platform).await?;

        let evaluation = costing::evaluate(&normalized, &resolved.fx, &resolved.fees, &resolved.tax)?;
        let snapshot = result::assemble(
            evaluation,
            &resolved.fx,
            &resolved.fees,
            &resolved.tax,
            Utc::now(),
        );

        info!(
            platform = %request.platform,
            profit = snapshot.outcome.profit.won(),
            is_loss = snapshot.outcome.is_loss,
            "Calculation complete"
        );

        let log = CalculationLog {
            platform: request.platform,
            ip_address: identity.ip,
            user_agent: identity.user_agent,
            input: request,
            profit: snapshot.outcome.profit,
        };

        match self.gateway.record(&log, &snapshot).await {
            Ok(result_id) => Ok(EngineOutcome {
                result: snapshot,
                result_id: Some(result_id),
                persistence_degraded: false,
            }),
            Err(e) => {
                warn!(error = %e, "Result persistence failed, returning degraded response");
                Ok(EngineOutcome {
                    result: snapshot,
                    result_id: None,
                    persistence_degraded: true,
                })
            }
        }
    }

    /// Replays a persisted snapshot by its shareable ID.
    pub async fn get_result(&self, id: &str) -> EngineResult<CalculationResult> {
        match self.gateway.fetch_snapshot(id).await {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Err(EngineError::ResultNotFound { id: id.to_string() }),
            Err(e) => Err(EngineError::internal(e.to_string())),
        }
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use relist_core::{
        Currency, FeeKind, FeeSchedule, FxRate, ImportTaxPolicy, Money, Platform, Rate,
    };
    use relist_db::{DbError, DbResult};

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Policy source with fixed answers and a lookup counter.
    struct FakePolicies {
        fx: Option<FxRate>,
        fees: Option<FeeSchedule>,
        tax: Option<ImportTaxPolicy>,
        lookups: AtomicU32,
    }

    impl FakePolicies {
        fn standard() -> Self {
            FakePolicies {
                fx: Some(FxRate {
                    rate: 1350.0,
                    provider: "customs_service".to_string(),
                    base_time: Utc.with_ymd_and_hms(2026, 8, 28, 0, 0, 0).unwrap(),
                }),
                fees: Some(FeeSchedule {
                    platform: Platform::Kream,
                    kind: FeeKind::Percentage {
                        rate: Rate::from_bps(550),
                    },
                    shipping_fee: Money::zero(),
                    version: "v1".to_string(),
                }),
                tax: Some(ImportTaxPolicy {
                    duty_rate: Rate::from_bps(1_300),
                    vat_rate: Rate::from_bps(1_000),
                    duty_free_limit: 150.0,
                    combined_risk_multiplier: 1.0,
                    policy_key: "kr_import".to_string(),
                    version: "v1".to_string(),
                }),
                lookups: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PolicySource for FakePolicies {
        async fn latest_fx(&self) -> DbResult<Option<FxRate>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.fx.clone())
        }

        async fn fee_schedule(&self, _platform: Platform) -> DbResult<Option<FeeSchedule>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.fees.clone())
        }

        async fn tax_policy(&self, _key: &str) -> DbResult<Option<ImportTaxPolicy>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.tax.clone())
        }
    }

    struct FakeCounter {
        prior_count: u32,
    }

    #[async_trait]
    impl RequestCounter for FakeCounter {
        async fn count_since(&self, _ip: &str, _cutoff: DateTime<Utc>) -> DbResult<u32> {
            Ok(self.prior_count)
        }
    }

    /// Gateway that records writes in memory, optionally failing them.
    struct FakeGateway {
        fail_writes: bool,
        recorded: Mutex<Vec<(CalculationLog, CalculationResult)>>,
    }

    impl FakeGateway {
        fn new(fail_writes: bool) -> Self {
            FakeGateway {
                fail_writes,
                recorded: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PersistenceGateway for FakeGateway {
        async fn record(
            &self,
            log: &CalculationLog,
            result: &CalculationResult,
        ) -> DbResult<String> {
            if self.fail_writes {
                return Err(DbError::QueryFailed("disk full".to_string()));
            }
            let mut recorded = self.recorded.lock().unwrap();
            recorded.push((log.clone(), result.clone()));
            Ok(format!("snapshot-{}", recorded.len()))
        }

        async fn fetch_snapshot(&self, id: &str) -> DbResult<Option<CalculationResult>> {
            let recorded = self.recorded.lock().unwrap();
            let index: usize = match id.strip_prefix("snapshot-") {
                Some(n) => n.parse().unwrap_or(0),
                None => return Ok(None),
            };
            Ok(recorded.get(index.wrapping_sub(1)).map(|(_, r)| r.clone()))
        }
    }

    fn engine_with(
        policies: FakePolicies,
        prior_count: u32,
        fail_writes: bool,
    ) -> (CalculationEngine, Arc<FakeGateway>, Arc<FakePolicies>) {
        let policies = Arc::new(policies);
        let gateway = Arc::new(FakeGateway::new(fail_writes));
        let engine = CalculationEngine::new(
            policies.clone(),
            Arc::new(FakeCounter { prior_count }),
            gateway.clone(),
            EngineConfig::default(),
        );
        (engine, gateway, policies)
    }

    fn kream_request(buy: i64, sell: f64) -> CalcRequest {
        CalcRequest {
            platform: Platform::Kream,
            buy_price_local: buy,
            sell_price: sell,
            sell_currency: Currency::Local,
            shipping_fee: None,
            other_cost: None,
            is_combined_tax_risk: None,
            quantity: None,
        }
    }

    fn identity() -> RequesterIdentity {
        RequesterIdentity {
            ip: "203.0.113.7".to_string(),
            user_agent: Some("test/1.0".to_string()),
        }
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_domestic_resale_under_threshold() {
        let (engine, gateway, _) = engine_with(FakePolicies::standard(), 0, false);

        let outcome = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap();

        let result = &outcome.result;
        assert_eq!(result.breakdown.platform_fee.won(), 8_250);
        assert_eq!(result.breakdown.customs_duty.won(), 0);
        assert_eq!(result.breakdown.vat.won(), 0);
        assert_eq!(result.outcome.profit.won(), 41_750);
        assert!(!result.outcome.is_loss);
        assert_eq!(result.badges.policy_ver, "v1");

        assert!(!outcome.persistence_degraded);
        assert_eq!(outcome.result_id.as_deref(), Some("snapshot-1"));

        // The log row carries the coarse profit.
        let recorded = gateway.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0.profit.won(), 41_750);
        assert_eq!(recorded[0].0.ip_address, "203.0.113.7");
    }

    #[tokio::test]
    async fn test_threshold_crossing_applies_duty_and_vat() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, false);

        // ₩250,000 at 1350 is ~$185.19, over the $150 threshold.
        let outcome = engine
            .calculate(kream_request(250_000, 400_000.0), identity())
            .await
            .unwrap();

        let b = &outcome.result.breakdown;
        assert_eq!(b.customs_duty.won(), 32_500); // 250,000 × 13%
        assert_eq!(b.vat.won(), 28_250); // (250,000 + 32,500) × 10%
        assert!(outcome
            .result
            .warnings
            .iter()
            .any(|w| w.contains("duty-free threshold")));
    }

    #[tokio::test]
    async fn test_risk_flag_under_threshold_warns_without_tax() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, false);

        // ₩189,000 at 1350 is $140, under the threshold even with the flag
        // (multiplier 1.0).
        let mut request = kream_request(189_000, 300_000.0);
        request.is_combined_tax_risk = Some(true);

        let outcome = engine.calculate(request, identity()).await.unwrap();

        assert_eq!(outcome.result.breakdown.customs_duty.won(), 0);
        assert_eq!(outcome.result.breakdown.vat.won(), 0);
        assert!(outcome
            .result
            .warnings
            .iter()
            .any(|w| w.contains("Combined-tax risk")));
    }

    #[tokio::test]
    async fn test_identical_requests_produce_identical_breakdowns() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, false);

        let first = engine
            .calculate(kream_request(250_000, 400_000.0), identity())
            .await
            .unwrap();
        let second = engine
            .calculate(kream_request(250_000, 400_000.0), identity())
            .await
            .unwrap();

        // Same inputs against unchanged policies: everything but the
        // timestamp and snapshot id must match.
        assert_eq!(first.result.breakdown, second.result.breakdown);
        assert_eq!(first.result.outcome, second.result.outcome);
        assert_eq!(first.result.badges, second.result.badges);
        assert_eq!(first.result.warnings, second.result.warnings);
        assert_ne!(first.result_id, second.result_id);
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_before_policy_lookup() {
        let (engine, gateway, policies) = engine_with(FakePolicies::standard(), 10, false);

        let err = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::RateLimitExceeded { .. }));
        assert_eq!(err.http_status(), 429);

        // Rejection happens before any policy or persistence work.
        assert_eq!(policies.lookups.load(Ordering::SeqCst), 0);
        assert!(gateway.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tenth_request_still_allowed() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 9, false);

        assert!(engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_persistence_failure_degrades_not_fails() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, true);

        let outcome = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap();

        assert!(outcome.persistence_degraded);
        assert!(outcome.result_id.is_none());
        assert_eq!(outcome.result.outcome.profit.won(), 41_750);
    }

    #[tokio::test]
    async fn test_missing_fee_rule_is_policy_not_found() {
        let mut policies = FakePolicies::standard();
        policies.fees = None;
        let (engine, _, _) = engine_with(policies, 0, false);

        let err = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::PolicyNotFound { .. }));
        assert_eq!(err.http_status(), 502);
    }

    #[tokio::test]
    async fn test_missing_fx_rate_is_rate_unavailable() {
        let mut policies = FakePolicies::standard();
        policies.fx = None;
        let (engine, _, _) = engine_with(policies, 0, false);

        let err = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::RateUnavailable { .. }));
        assert_eq!(err.http_status(), 503);
    }

    #[tokio::test]
    async fn test_missing_tax_policy_falls_back() {
        let mut policies = FakePolicies::standard();
        policies.tax = None;
        let (engine, _, _) = engine_with(policies, 0, false);

        let outcome = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap();

        assert_eq!(outcome.result.badges.tax_rule, "default_fallback");
        // Fallback thresholds still apply: ₩100,000 is ~$74, no tax.
        assert_eq!(outcome.result.breakdown.customs_duty.won(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, false);

        let err = engine
            .calculate(kream_request(0, 150_000.0), identity())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn test_persisted_result_replays_verbatim() {
        let (engine, _, _) = engine_with(FakePolicies::standard(), 0, false);

        let outcome = engine
            .calculate(kream_request(100_000, 150_000.0), identity())
            .await
            .unwrap();
        let id = outcome.result_id.unwrap();

        let replayed = engine.get_result(&id).await.unwrap();
        assert_eq!(replayed, outcome.result);

        let err = engine.get_result("snapshot-999").await.unwrap_err();
        assert!(matches!(err, EngineError::ResultNotFound { .. }));
        assert_eq!(err.http_status(), 404);
    }
}
