//! # Import Tax Policy Repository
//!
//! Versioned import tax policies, keyed by a logical policy key
//! (`"kr_import"` in this deployment).
//!
//! Same append-only lifecycle as fee rules: publishing deactivates the
//! current active rows for the key and inserts the replacement. The
//! `source_checked_at` column records when the official-data sync job last
//! confirmed the policy against its upstream source.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use relist_core::{ImportTaxPolicy, Rate};

/// A raw `tax_policies` row.
#[derive(Debug, sqlx::FromRow)]
struct TaxPolicyRow {
    id: String,
    policy_key: String,
    duty_rate_bps: i64,
    vat_rate_bps: i64,
    duty_free_limit_usd: f64,
    combined_risk_multiplier: f64,
    version: String,
}

impl TaxPolicyRow {
    fn into_domain(self) -> DbResult<ImportTaxPolicy> {
        let table = "tax_policies";

        let duty_bps = u32::try_from(self.duty_rate_bps).map_err(|_| {
            DbError::corrupt(
                table,
                &self.id,
                format!("duty_rate_bps {} out of range", self.duty_rate_bps),
            )
        })?;
        let vat_bps = u32::try_from(self.vat_rate_bps).map_err(|_| {
            DbError::corrupt(
                table,
                &self.id,
                format!("vat_rate_bps {} out of range", self.vat_rate_bps),
            )
        })?;

        if !self.duty_free_limit_usd.is_finite() || self.duty_free_limit_usd < 0.0 {
            return Err(DbError::corrupt(
                table,
                &self.id,
                format!("duty_free_limit_usd {} invalid", self.duty_free_limit_usd),
            ));
        }

        Ok(ImportTaxPolicy {
            duty_rate: Rate::from_bps(duty_bps),
            vat_rate: Rate::from_bps(vat_bps),
            duty_free_limit: self.duty_free_limit_usd,
            combined_risk_multiplier: self.combined_risk_multiplier,
            policy_key: self.policy_key,
            version: self.version,
        })
    }
}

/// Repository for import tax policies.
#[derive(Debug, Clone)]
pub struct TaxPolicyRepository {
    pool: SqlitePool,
}

impl TaxPolicyRepository {
    /// Creates a new TaxPolicyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxPolicyRepository { pool }
    }

    /// Returns the active policy for a key, or `None` when no active row
    /// exists. Absence is not an error here; the engine substitutes the
    /// built-in fallback policy.
    pub async fn active_for(&self, policy_key: &str) -> DbResult<Option<ImportTaxPolicy>> {
        debug!(policy_key = %policy_key, "Resolving active tax policy");

        let row = sqlx::query_as::<_, TaxPolicyRow>(
            r#"
            SELECT id, policy_key, duty_rate_bps, vat_rate_bps,
                   duty_free_limit_usd, combined_risk_multiplier, version
            FROM tax_policies
            WHERE policy_key = ?1 AND is_active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(policy_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaxPolicyRow::into_domain).transpose()
    }

    /// Publishes a new policy version: deactivates the key's current active
    /// rows and inserts the replacement, atomically.
    pub async fn publish(&self, policy: &ImportTaxPolicy) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tax_policies SET is_active = 0 WHERE policy_key = ?1 AND is_active = 1")
            .bind(&policy.policy_key)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO tax_policies
                (id, policy_key, duty_rate_bps, vat_rate_bps, duty_free_limit_usd,
                 combined_risk_multiplier, version, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
        )
        .bind(&id)
        .bind(&policy.policy_key)
        .bind(policy.duty_rate.bps())
        .bind(policy.vat_rate.bps())
        .bind(policy.duty_free_limit)
        .bind(policy.combined_risk_multiplier)
        .bind(&policy.version)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(policy_key = %policy.policy_key, version = %policy.version, "Tax policy published");
        Ok(id)
    }

    /// Records that the sync job verified the active policy against its
    /// official upstream source at `checked_at`.
    pub async fn mark_source_checked(
        &self,
        policy_key: &str,
        checked_at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            "UPDATE tax_policies SET source_checked_at = ?1 WHERE policy_key = ?2 AND is_active = 1",
        )
        .bind(checked_at)
        .bind(policy_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
