//! # relist-core: Pure Calculation Logic
//!
//! This crate is the **heart** of relist. It contains the cost/tax/fee
//! model as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         relist Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │        POST /api/v1/calc ──► GET /api/v1/results/{id}           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   relist-engine                                 │   │
//! │  │   rate limit ──► resolve policies ──► compute ──► persist       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ relist-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   money   │  │   fees    │  │    tax    │  │ validation│   │   │
//! │  │   │ Money/Rate│  │  FeeKind  │  │ threshold │  │  contract │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │          ┌───────────┐  ┌───────────┐                          │   │
//! │  │          │  costing  │  │  result   │                          │   │
//! │  │          │ CostModel │  │ assembler │                          │   │
//! │  │          └───────────┘  └───────────┘                          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same inputs = same breakdown, byte for byte
//! 2. **Integer Money**: whole KRW as i64; floats only at the FX boundary
//! 3. **Tagged Dispatch**: fee shapes are enum variants, exhaustiveness
//!    checked at compile time
//! 4. **Explicit Errors**: malformed policy fails loudly, never silently

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod fees;
pub mod money;
pub mod result;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fees::{FeeKind, FeeSchedule};
pub use money::{Money, Rate};
pub use tax::{ImportTaxPolicy, TaxAssessment};
pub use types::*;
pub use validation::{validate, NormalizedRequest};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Logical key of the single import-tax policy in use.
///
/// The schema supports multiple policy keys (per import regime); v0.1 only
/// resolves Korean personal imports.
pub const IMPORT_TAX_POLICY_KEY: &str = "kr_import";
