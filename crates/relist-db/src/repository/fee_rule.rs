//! # Platform Fee Rule Repository
//!
//! Versioned per-platform fee rules.
//!
//! ## Versioning Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Deactivate-then-insert (never edit in place)               │
//! │                                                                         │
//! │  publish(kream, v2)                                                    │
//! │       │                                                                 │
//! │       ▼  (one transaction)                                              │
//! │  UPDATE platform_fee_rules SET is_active = 0                           │
//! │    WHERE platform = 'kream' AND is_active = 1                          │
//! │  INSERT new row (is_active = 1, version = 'v2')                        │
//! │                                                                         │
//! │  Old rows stay forever: a persisted snapshot's badges name the version │
//! │  that produced it, and that row must remain inspectable.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## fee_type Tags
//! - `'percentage'`          → rate only
//! - `'fixed'`               → flat amount (stored in min_fee)
//! - `'percentage_bounded'`  → rate clamped to [min_fee, max_fee]
//! - `NULL`                  → legacy rows: rate plus min_fee added on top

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use relist_core::{FeeKind, FeeSchedule, Money, Platform, Rate};

/// A raw `platform_fee_rules` row, before shape dispatch.
#[derive(Debug, sqlx::FromRow)]
struct FeeRuleRow {
    id: String,
    platform: String,
    fee_type: Option<String>,
    rate_bps: i64,
    min_fee: i64,
    max_fee: Option<i64>,
    shipping_fee: i64,
    version: String,
}

impl FeeRuleRow {
    /// Converts the row into a domain schedule, dispatching on fee_type.
    ///
    /// Bad tags and malformed columns are `CorruptRow`, not `NotFound`:
    /// the policy exists, an operator just broke it.
    fn into_domain(self) -> DbResult<FeeSchedule> {
        let table = "platform_fee_rules";

        let platform = Platform::parse(&self.platform).ok_or_else(|| {
            DbError::corrupt(table, &self.id, format!("unknown platform '{}'", self.platform))
        })?;

        let rate_bps = u32::try_from(self.rate_bps).map_err(|_| {
            DbError::corrupt(table, &self.id, format!("rate_bps {} out of range", self.rate_bps))
        })?;
        let rate = Rate::from_bps(rate_bps);
        let min_fee = Money::from_won(self.min_fee);

        let kind = match self.fee_type.as_deref() {
            Some("percentage") => FeeKind::Percentage { rate },
            // Flat rules reuse the min_fee column for the amount.
            Some("fixed") => FeeKind::Fixed { amount: min_fee },
            Some("percentage_bounded") => {
                let max_fee = self.max_fee.ok_or_else(|| {
                    DbError::corrupt(table, &self.id, "bounded rule missing max_fee")
                })?;
                FeeKind::PercentageBounded {
                    rate,
                    min_fee,
                    max_fee: Money::from_won(max_fee),
                }
            }
            None => FeeKind::RatePlusMinimum { rate, min_fee },
            Some(other) => {
                return Err(DbError::corrupt(
                    table,
                    &self.id,
                    format!("unknown fee_type '{other}'"),
                ))
            }
        };

        Ok(FeeSchedule {
            platform,
            kind,
            shipping_fee: Money::from_won(self.shipping_fee),
            version: self.version,
        })
    }
}

/// Repository for platform fee rules.
#[derive(Debug, Clone)]
pub struct FeeRuleRepository {
    pool: SqlitePool,
}

impl FeeRuleRepository {
    /// Creates a new FeeRuleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeeRuleRepository { pool }
    }

    /// Returns the active fee rule for a platform, or `None` when the
    /// platform has no active row.
    ///
    /// Transient multi-active rows (a crashed publish) are tolerated by
    /// taking the newest; zero active rows is the caller's not-found case.
    pub async fn active_for(&self, platform: Platform) -> DbResult<Option<FeeSchedule>> {
        debug!(platform = %platform, "Resolving active fee rule");

        let row = sqlx::query_as::<_, FeeRuleRow>(
            r#"
            SELECT id, platform, fee_type, rate_bps, min_fee, max_fee, shipping_fee, version
            FROM platform_fee_rules
            WHERE platform = ?1 AND is_active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FeeRuleRow::into_domain).transpose()
    }

    /// Publishes a new fee rule version: deactivates the platform's current
    /// active rows and inserts the replacement, atomically.
    pub async fn publish(&self, schedule: &FeeSchedule) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let (fee_type, rate_bps, min_fee, max_fee): (Option<&str>, u32, i64, Option<i64>) =
            match schedule.kind {
                FeeKind::Percentage { rate } => (Some("percentage"), rate.bps(), 0, None),
                FeeKind::Fixed { amount } => (Some("fixed"), 0, amount.won(), None),
                FeeKind::PercentageBounded {
                    rate,
                    min_fee,
                    max_fee,
                } => (
                    Some("percentage_bounded"),
                    rate.bps(),
                    min_fee.won(),
                    Some(max_fee.won()),
                ),
                FeeKind::RatePlusMinimum { rate, min_fee } => (None, rate.bps(), min_fee.won(), None),
            };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE platform_fee_rules SET is_active = 0 WHERE platform = ?1 AND is_active = 1",
        )
        .bind(schedule.platform.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO platform_fee_rules
                (id, platform, fee_type, rate_bps, min_fee, max_fee, shipping_fee,
                 version, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)
            "#,
        )
        .bind(&id)
        .bind(schedule.platform.as_str())
        .bind(fee_type)
        .bind(rate_bps)
        .bind(min_fee)
        .bind(max_fee)
        .bind(schedule.shipping_fee.won())
        .bind(&schedule.version)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(platform = %schedule.platform, version = %schedule.version, "Fee rule published");
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
