//! # Exchange Rate Repository
//!
//! Lookup and append of daily official exchange rates.
//!
//! ## Selection Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Which FX row wins for USD→KRW?                             │
//! │                                                                         │
//! │  fx_rates                                                              │
//! │  ┌──────────────────────────────────────────────────┐                  │
//! │  │ USD KRW 1342.0  2026-08-27  customs_service      │                  │
//! │  │ USD KRW 1350.0  2026-08-28  customs_service      │ ← latest         │
//! │  │ USD KRW 1338.5  2026-08-26  customs_service      │   base_time wins │
//! │  └──────────────────────────────────────────────────┘                  │
//! │                                                                         │
//! │  ORDER BY base_time DESC LIMIT 1 — older rows stay for audit.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use relist_core::FxRate;

/// A raw `fx_rates` row.
#[derive(Debug, sqlx::FromRow)]
struct FxRateRow {
    rate: f64,
    provider: String,
    base_time: DateTime<Utc>,
}

impl From<FxRateRow> for FxRate {
    fn from(row: FxRateRow) -> Self {
        FxRate {
            rate: row.rate,
            provider: row.provider,
            base_time: row.base_time,
        }
    }
}

/// Repository for exchange rate rows.
#[derive(Debug, Clone)]
pub struct FxRateRepository {
    pool: SqlitePool,
}

impl FxRateRepository {
    /// Creates a new FxRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FxRateRepository { pool }
    }

    /// Returns the most recent rate for a currency pair, or `None` when the
    /// table has no row for the pair at all.
    ///
    /// Latest `base_time` wins; ties (same day, different provider) fall back
    /// to insertion recency via `created_at`.
    pub async fn latest(&self, base: &str, quote: &str) -> DbResult<Option<FxRate>> {
        debug!(base = %base, quote = %quote, "Resolving latest FX rate");

        let row = sqlx::query_as::<_, FxRateRow>(
            r#"
            SELECT rate, provider, base_time
            FROM fx_rates
            WHERE base_currency = ?1 AND quote_currency = ?2
            ORDER BY base_time DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(base)
        .bind(quote)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FxRate::from))
    }

    /// Appends a new daily rate. Rows are never updated in place; the sync
    /// job inserts one row per (pair, day, provider).
    pub async fn insert(
        &self,
        base: &str,
        quote: &str,
        rate: f64,
        base_time: DateTime<Utc>,
        provider: &str,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO fx_rates
                (id, base_currency, quote_currency, rate, base_time, provider, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(base)
        .bind(quote)
        .bind(rate)
        .bind(base_time)
        .bind(provider)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, rate = rate, "FX rate inserted");
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_latest_picks_newest_base_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fx_rates();

        let day1 = Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 8, 28, 0, 0, 0).unwrap();
        let day3 = Utc.with_ymd_and_hms(2026, 8, 27, 0, 0, 0).unwrap();

        repo.insert("USD", "KRW", 1338.5, day1, "customs_service")
            .await
            .unwrap();
        repo.insert("USD", "KRW", 1350.0, day2, "customs_service")
            .await
            .unwrap();
        repo.insert("USD", "KRW", 1342.0, day3, "customs_service")
            .await
            .unwrap();

        let fx = repo.latest("USD", "KRW").await.unwrap().unwrap();
        assert_eq!(fx.rate, 1350.0);
        assert_eq!(fx.provider, "customs_service");
        assert_eq!(fx.base_date(), "2026-08-28");
    }

    #[tokio::test]
    async fn test_latest_missing_pair_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let fx = db.fx_rates().latest("USD", "KRW").await.unwrap();
        assert!(fx.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_day_provider_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fx_rates();

        let day = Utc.with_ymd_and_hms(2026, 8, 28, 0, 0, 0).unwrap();
        repo.insert("USD", "KRW", 1350.0, day, "customs_service")
            .await
            .unwrap();

        let dup = repo
            .insert("USD", "KRW", 1351.0, day, "customs_service")
            .await;
        assert!(dup.is_err());
    }
}
