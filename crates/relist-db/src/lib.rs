//! # relist-db: Database Layer for relist
//!
//! This crate provides database access for the resale profit calculator.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        relist Data Flow                                 │
//! │                                                                         │
//! │  API Handler (POST /api/v1/calc)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  relist-engine (policy resolution, rate limiting, persistence)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     relist-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ FxRateRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ FeeRuleRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ TaxPolicyRepo │    │ ...          │  │   │
//! │  │   │ Management    │    │ CalcLogRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (relist.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (fx, fees, tax, logs)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relist_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/relist.db")).await?;
//!
//! let fx = db.fx_rates().latest("USD", "KRW").await?;
//! let fees = db.fee_rules().active_for(Platform::Kream).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::calc_log::{CalcLogRepository, SNAPSHOT_VERSION};
pub use repository::fee_rule::FeeRuleRepository;
pub use repository::fx_rate::FxRateRepository;
pub use repository::tax_policy::TaxPolicyRepository;
