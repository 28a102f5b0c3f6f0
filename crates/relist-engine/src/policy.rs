//! # Policy Resolution
//!
//! Resolves the three policy inputs a calculation needs, concurrently.
//!
//! ## Fan-out and Fallback Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    resolve(platform)                                    │
//! │                                                                         │
//! │        ┌──────────────┬──────────────────┬──────────────────┐           │
//! │        ▼              ▼                  ▼                  │           │
//! │   latest FX      active fee rule    active tax policy   (tokio::join!) │
//! │        │              │                  │                              │
//! │   missing?        missing?          missing or failed?                 │
//! │        │              │                  │                              │
//! │   RateUnavailable PolicyNotFound    built-in fallback + warn           │
//! │      (503)          (502)           (13% / 10% / $150)                 │
//! │                                                                         │
//! │  The asymmetry is intentional: without an FX rate or fee rule the      │
//! │  commercial outcome cannot be computed honestly, so the request fails. │
//! │  The tax policy is a compliance aid and degrades to the conservative   │
//! │  default instead.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tracing::warn;

use relist_core::{FeeSchedule, FxRate, ImportTaxPolicy, Platform, IMPORT_TAX_POLICY_KEY};
use relist_db::{Database, DbError, DbResult};

use crate::error::{EngineError, EngineResult};

/// The currency pair this deployment resolves.
const FX_BASE: &str = "USD";
const FX_QUOTE: &str = "KRW";

// =============================================================================
// Policy Source
// =============================================================================

/// Read access to the three policy stores.
///
/// `None` means "no active row", which each lookup site interprets with its
/// own semantics; `Err` is a lookup failure.
#[async_trait]
pub trait PolicySource: Send + Sync {
    /// The most recent USD→KRW rate.
    async fn latest_fx(&self) -> DbResult<Option<FxRate>>;

    /// The active fee rule for a platform.
    async fn fee_schedule(&self, platform: Platform) -> DbResult<Option<FeeSchedule>>;

    /// The active import tax policy for a key.
    async fn tax_policy(&self, policy_key: &str) -> DbResult<Option<ImportTaxPolicy>>;
}

/// The production policy source, backed by the SQLite repositories.
#[derive(Debug, Clone)]
pub struct SqlitePolicySource {
    db: Database,
}

impl SqlitePolicySource {
    pub fn new(db: Database) -> Self {
        SqlitePolicySource { db }
    }
}

#[async_trait]
impl PolicySource for SqlitePolicySource {
    async fn latest_fx(&self) -> DbResult<Option<FxRate>> {
        self.db.fx_rates().latest(FX_BASE, FX_QUOTE).await
    }

    async fn fee_schedule(&self, platform: Platform) -> DbResult<Option<FeeSchedule>> {
        self.db.fee_rules().active_for(platform).await
    }

    async fn tax_policy(&self, policy_key: &str) -> DbResult<Option<ImportTaxPolicy>> {
        self.db.tax_policies().active_for(policy_key).await
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// The full policy set a calculation runs against.
#[derive(Debug, Clone)]
pub struct ResolvedPolicies {
    pub fx: FxRate,
    pub fees: FeeSchedule,
    pub tax: ImportTaxPolicy,
}

/// Resolves all three policies concurrently.
pub async fn resolve(
    source: &dyn PolicySource,
    platform: Platform,
) -> EngineResult<ResolvedPolicies> {
    let (fx, fees, tax) = tokio::join!(
        source.latest_fx(),
        source.fee_schedule(platform),
        source.tax_policy(IMPORT_TAX_POLICY_KEY),
    );

    let fx = match fx {
        Ok(Some(fx)) => fx,
        Ok(None) => {
            return Err(EngineError::RateUnavailable {
                detail: format!("no {FX_BASE}/{FX_QUOTE} rate row"),
            })
        }
        Err(e) => {
            return Err(EngineError::RateUnavailable {
                detail: e.to_string(),
            })
        }
    };

    let fees = match fees {
        Ok(Some(fees)) => fees,
        Ok(None) => return Err(EngineError::PolicyNotFound { platform }),
        // A malformed fee row is an operator problem, not missing config.
        Err(DbError::CorruptRow { table, id, reason }) => {
            return Err(EngineError::PolicyError {
                detail: format!("{table} ({id}): {reason}"),
            })
        }
        Err(e) => return Err(EngineError::internal(e.to_string())),
    };

    let tax = match tax {
        Ok(Some(tax)) => tax,
        Ok(None) => ImportTaxPolicy::fallback(),
        Err(e) => {
            warn!(error = %e, "Tax policy lookup failed, using fallback policy");
            ImportTaxPolicy::fallback()
        }
    };

    Ok(ResolvedPolicies { fx, fees, tax })
}
