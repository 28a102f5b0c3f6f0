//! # Repository Module
//!
//! Database repository implementations for relist.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine / Handler                                                      │
//! │       │                                                                 │
//! │       │  db.fee_rules().active_for(Platform::Kream)                    │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  FeeRuleRepository                                                     │
//! │  ├── active_for(&self, platform)                                       │
//! │  └── publish(&self, schedule)                                          │
//! │       │                                                                 │
//! │       │  SQL Query + row → domain conversion                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Row decoding errors surface as typed DbError variants               │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`fx_rate::FxRateRepository`] - Daily exchange rate lookup
//! - [`fee_rule::FeeRuleRepository`] - Versioned platform fee rules
//! - [`tax_policy::TaxPolicyRepository`] - Versioned import tax policies
//! - [`calc_log::CalcLogRepository`] - Audit log, rate-limit counting, snapshots

pub mod calc_log;
pub mod fee_rule;
pub mod fx_rate;
pub mod tax_policy;
