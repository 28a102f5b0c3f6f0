//! # Money Module
//!
//! Monetary values and percentage rates for the profit calculator.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Won                                              │
//! │    KRW has no minor unit, so every amount in the system is a whole      │
//! │    number of won stored as i64. Floats appear only at the FX boundary   │
//! │    (USD values, exchange rates) and are rounded to whole won the        │
//! │    moment they become money.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use relist_core::money::{Money, Rate};
//!
//! let sell = Money::from_won(150_000);
//! let fee = sell.apply_rate(Rate::from_bps(550)); // 5.5%
//! assert_eq!(fee.won(), 8_250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole KRW.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative; every breakdown term is >= 0
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: FX conversions go through [`Money::from_f64_rounded`]
///   so the single rounding point is explicit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole won.
    #[inline]
    pub const fn from_won(won: i64) -> Self {
        Money(won)
    }

    /// Rounds a fractional won amount (e.g. a converted USD price) to the
    /// nearest whole won. This is the only place float money enters the
    /// integer domain.
    #[inline]
    pub fn from_f64_rounded(amount: f64) -> Self {
        Money(amount.round() as i64)
    }

    /// Floors a fractional won amount to whole won.
    ///
    /// Used for derived outputs (break-even price) where rounding up would
    /// overstate the answer.
    #[inline]
    pub fn from_f64_floored(amount: f64) -> Self {
        Money(amount.floor() as i64)
    }

    /// Returns the value in whole won.
    #[inline]
    pub const fn won(&self) -> i64 {
        self.0
    }

    /// Zero won.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a percentage rate with half-up rounding to whole won.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow on large amounts:
    /// `(amount * bps + 5000) / 10000`. The +5000 provides rounding
    /// (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use relist_core::money::{Money, Rate};
    ///
    /// // ₩250,000 at 13% duty = ₩32,500
    /// let duty = Money::from_won(250_000).apply_rate(Rate::from_bps(1300));
    /// assert_eq!(duty.won(), 32_500);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let won = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_won(won as i64)
    }

    /// Multiplies money by a quantity (per-unit platform shipping charges).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the amount as f64 for ratio computations (margin rate,
    /// FX conversion to USD). Never feed the result back into Money
    /// without an explicit rounding constructor.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 550 bps = 5.5% (kream sale fee), 1300 bps = 13% (import duty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a fraction (0.055 → 550 bps).
    ///
    /// Policy rows store rates as fractions; the half-up rounding here keeps
    /// row → domain conversion deterministic.
    pub fn from_fraction(fraction: f64) -> Self {
        Rate((fraction * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (550 bps → 0.055).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Returns the rate as a percentage (550 bps → 5.5), for display.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// A rate of 100% or more can never be a valid variable fee: the
    /// break-even denominator `1 - rate` becomes zero or negative.
    #[inline]
    pub const fn is_confiscatory(&self) -> bool {
        self.0 >= 10_000
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
/// For debugging; the frontend formats for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₩{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
