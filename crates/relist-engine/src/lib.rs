//! # relist-engine: Request Orchestration
//!
//! Everything between the HTTP surface and the pure cost model: admission
//! control, policy resolution, evaluation, and persistence.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        relist Request Flow                              │
//! │                                                                         │
//! │  relist-api (axum handler)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   relist-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  CalculationEngine                                              │   │
//! │  │   ├── limiter    (RequestCounter seam)                          │   │
//! │  │   ├── policy     (PolicySource seam, 3-way fan-out)             │   │
//! │  │   ├── relist-core evaluate + assemble                           │   │
//! │  │   └── persist    (PersistenceGateway seam)                      │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  relist-db (SQLite repositories)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three seams are traits so the whole pipeline runs against in-process
//! fakes in the scenario tests.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod limiter;
pub mod persist;
pub mod policy;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{CalculationEngine, EngineConfig, EngineOutcome};
pub use error::{EngineError, EngineResult};
pub use limiter::{LogBackedCounter, RateLimiter, RequestCounter};
pub use persist::{PersistenceGateway, SqliteGateway};
pub use policy::{PolicySource, ResolvedPolicies, SqlitePolicySource};
