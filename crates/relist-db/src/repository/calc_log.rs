//! # Calculation Log Repository
//!
//! Audit log rows, rate-limit counting, and immutable result snapshots.
//!
//! ## Write Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Per-request persistence sequence                        │
//! │                                                                         │
//! │  1. insert_log(log)            → log row (who asked, what, coarse      │
//! │     │                            profit)                                │
//! │     ▼                                                                   │
//! │  2. insert_snapshot(log_id, …) → result row (full payload, verbatim)   │
//! │                                                                         │
//! │  The snapshot references its log row; both are append-only and never   │
//! │  mutated. The same calculation_logs table doubles as the rate-limit    │
//! │  counter: count rows per IP inside the sliding window.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use relist_core::{CalculationLog, CalculationResult};

/// Version tag stored alongside every snapshot payload, bumped if the
/// payload shape ever changes.
pub const SNAPSHOT_VERSION: &str = "1";

/// Repository for calculation logs and result snapshots.
#[derive(Debug, Clone)]
pub struct CalcLogRepository {
    pool: SqlitePool,
}

impl CalcLogRepository {
    /// Creates a new CalcLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CalcLogRepository { pool }
    }

    /// Appends one audit log row and returns its ID.
    pub async fn insert_log(&self, log: &CalculationLog) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let input_payload = serde_json::to_string(&log.input)?;

        sqlx::query(
            r#"
            INSERT INTO calculation_logs
                (id, platform, ip_address, user_agent, input_payload, profit, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(log.platform.as_str())
        .bind(&log.ip_address)
        .bind(&log.user_agent)
        .bind(input_payload)
        .bind(log.profit.won())
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, ip = %log.ip_address, "Calculation log recorded");
        Ok(id)
    }

    /// Counts log rows for an IP with `created_at >= cutoff`.
    ///
    /// This is the rate-limit counter: the number of calculations this
    /// requester already completed inside the sliding window.
    pub async fn count_for_ip_since(&self, ip: &str, cutoff: DateTime<Utc>) -> DbResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM calculation_logs WHERE ip_address = ?1 AND created_at >= ?2",
        )
        .bind(ip)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u32)
    }

    /// Appends the immutable result snapshot for a log row and returns the
    /// snapshot ID (the shareable result reference).
    pub async fn insert_snapshot(
        &self,
        log_id: &str,
        result: &CalculationResult,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let result_payload = serde_json::to_string(result)?;

        sqlx::query(
            r#"
            INSERT INTO calc_results
                (id, log_id, result_payload, snapshot_version, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(log_id)
        .bind(result_payload)
        .bind(SNAPSHOT_VERSION)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, log_id = %log_id, "Result snapshot recorded");
        Ok(id)
    }

    /// Fetches a persisted snapshot by ID, or `None` when no such snapshot
    /// exists. The payload is returned exactly as stored.
    pub async fn get_snapshot(&self, id: &str) -> DbResult<Option<CalculationResult>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT result_payload FROM calc_results WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use relist_core::{
        CalcRequest, CalculationResult, CostBreakdown, Currency, Money, Outcome, Platform,
        PolicyBadges, ResultMeta,
    };

    fn sample_log(ip: &str) -> CalculationLog {
        CalculationLog {
            platform: Platform::Kream,
            ip_address: ip.to_string(),
            user_agent: Some("test-agent/1.0".to_string()),
            input: CalcRequest {
                platform: Platform::Kream,
                buy_price_local: 100_000,
                sell_price: 150_000.0,
                sell_currency: Currency::Local,
                shipping_fee: None,
                other_cost: None,
                is_combined_tax_risk: None,
                quantity: None,
            },
            profit: Money::from_won(41_750),
        }
    }

    fn sample_result() -> CalculationResult {
        CalculationResult {
            meta: ResultMeta {
                currency: "KRW".to_string(),
                timestamp: Utc::now(),
                fx_rate: 1350.0,
            },
            breakdown: CostBreakdown {
                buy_price: Money::from_won(100_000),
                intl_shipping: Money::zero(),
                customs_duty: Money::zero(),
                vat: Money::zero(),
                platform_fee: Money::from_won(8_250),
                platform_shipping_fee: Money::zero(),
                other_cost: Money::zero(),
                total_cost: Money::from_won(108_250),
                gross_revenue: Money::from_won(150_000),
            },
            outcome: Outcome {
                profit: Money::from_won(41_750),
                margin_rate: 27.83,
                break_even_price: Money::from_won(105_820),
                is_loss: false,
            },
            badges: PolicyBadges {
                fx_provider: "customs_service".to_string(),
                fx_date: "2026-08-28".to_string(),
                policy_ver: "v1".to_string(),
                tax_rule: "kr_import".to_string(),
            },
            warnings: vec![],
        }
    }

    #[tokio::test]
    async fn test_log_then_snapshot_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.calc_logs();

        let log_id = repo.insert_log(&sample_log("1.2.3.4")).await.unwrap();

        let result = sample_result();
        let snapshot_id = repo.insert_snapshot(&log_id, &result).await.unwrap();

        let fetched = repo.get_snapshot(&snapshot_id).await.unwrap().unwrap();
        assert_eq!(fetched.outcome.profit, result.outcome.profit);
        assert_eq!(fetched.badges, result.badges);
        assert_eq!(fetched.breakdown.total_cost, result.breakdown.total_cost);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let fetched = db.calc_logs().get_snapshot("no-such-id").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_requires_existing_log() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .calc_logs()
            .insert_snapshot("orphan-log-id", &sample_result())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_count_scopes_by_ip_and_cutoff() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.calc_logs();

        for _ in 0..3 {
            repo.insert_log(&sample_log("1.2.3.4")).await.unwrap();
        }
        repo.insert_log(&sample_log("5.6.7.8")).await.unwrap();

        // A log row outside the window, inserted with an old timestamp.
        let stale = Utc::now() - Duration::seconds(120);
        sqlx::query(
            r#"
            INSERT INTO calculation_logs
                (id, platform, ip_address, user_agent, input_payload, profit, created_at)
            VALUES ('stale-row', 'kream', '1.2.3.4', NULL, '{}', 0, ?1)
            "#,
        )
        .bind(stale)
        .execute(db.pool())
        .await
        .unwrap();

        let cutoff = Utc::now() - Duration::seconds(60);
        assert_eq!(repo.count_for_ip_since("1.2.3.4", cutoff).await.unwrap(), 3);
        assert_eq!(repo.count_for_ip_since("5.6.7.8", cutoff).await.unwrap(), 1);
        assert_eq!(repo.count_for_ip_since("9.9.9.9", cutoff).await.unwrap(), 0);
    }
}
