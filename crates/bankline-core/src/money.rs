//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Line amounts from the accounting API can carry more than two          │
//! │  fractional digits (100.005), so integer cents cannot hold them.       │
//! │                                                                         │
//! │  OUR SOLUTION: Exact decimals (rust_decimal)                            │
//! │    100.005 stays 100.005 until we explicitly round it to 2 places      │
//! │    with one well-defined RoundingMode                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bankline_core::money::{Money, RoundingMode};
//!
//! let amount: Money = "100.005".parse().unwrap();
//! assert_eq!(amount.round(RoundingMode::HalfUp), Money::new(10001, 2));
//! assert_eq!(amount.round(RoundingMode::Bankers), Money::new(10000, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::MONEY_SCALE;

// =============================================================================
// Rounding Mode
// =============================================================================

/// How a monetary value is rounded to two decimal places.
///
/// ## Midpoint Behavior
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  value      HalfUp (default)     Bankers (half to even)            │
/// │  ────────   ────────────────     ──────────────────────            │
/// │  100.005    100.01               100.00                            │
/// │  100.015    100.02               100.02                            │
/// │  -100.005   -100.01              -100.00                           │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// HalfUp rounds midpoints away from zero, which is what the accounting
/// API does when it rounds line amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Midpoint away from zero.
    #[default]
    HalfUp,

    /// Midpoint to the nearest even digit.
    Bankers,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Bankers => RoundingStrategy::MidpointNearestEven,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfUp => write!(f, "half_up"),
            RoundingMode::Bankers => write!(f, "bankers"),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "half_up" | "half-up" | "halfup" => Ok(RoundingMode::HalfUp),
            "bankers" | "half_even" | "half-even" => Ok(RoundingMode::Bankers),
            other => Err(ConfigError::InvalidValue {
                key: "rounding".to_string(),
                reason: format!(
                    "unknown rounding mode '{}'. Valid options: half_up, bankers",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount.
///
/// ## Design Decisions
/// - **Decimal (not f64, not i64 cents)**: keeps raw line amounts exact
/// - **Signed**: credit notes and refunds produce negative lines
/// - **No currency**: a transaction is single-currency; the currency code is
///   the persistence collaborator's concern
///
/// ## Where Money is Used
/// ```text
/// LineItem.line_amount ──┐
///                        ├──► Aggregator (round each, fold) ──► sub_total
/// LineItem.tax_amount ───┘                                 ──► total_tax
///
/// StoredTransaction.SubTotal / TotalTax ──► cached totals (hydration only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates Money from a mantissa and a scale.
    ///
    /// ## Example
    /// ```rust
    /// use bankline_core::money::Money;
    ///
    /// let price = Money::new(15001, 2); // 150.01
    /// assert_eq!(price.to_string(), "150.01");
    /// ```
    #[inline]
    pub fn new(num: i64, scale: u32) -> Self {
        Money(Decimal::new(num, scale))
    }

    /// Wraps an existing decimal.
    #[inline]
    pub const fn from_decimal(value: Decimal) -> Self {
        Money(value)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero at two decimal places (`0.00`).
    #[inline]
    pub fn zero() -> Self {
        Money(Decimal::new(0, MONEY_SCALE))
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to two decimal places with the given mode.
    ///
    /// The result always carries exactly two fractional digits, so
    /// `Money::new(150, 0).round(..)` displays as `150.00`.
    pub fn round(&self, mode: RoundingMode) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(MONEY_SCALE, mode.strategy());
        rounded.rescale(MONEY_SCALE);
        Money(rounded)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(money("10.99").to_string(), "10.99");
        assert_eq!(money(" 100.005 ").to_string(), "100.005");
        assert!("ten".parse::<Money>().is_err());
    }

    #[test]
    fn test_zero_has_two_places() {
        assert_eq!(Money::zero().to_string(), "0.00");
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn test_round_half_up_midpoints() {
        assert_eq!(money("100.005").round(RoundingMode::HalfUp), money("100.01"));
        assert_eq!(money("100.015").round(RoundingMode::HalfUp), money("100.02"));
        assert_eq!(money("-100.005").round(RoundingMode::HalfUp), money("-100.01"));
        assert_eq!(money("0.004").round(RoundingMode::HalfUp), money("0.00"));
    }

    #[test]
    fn test_round_bankers_midpoints() {
        assert_eq!(money("100.005").round(RoundingMode::Bankers), money("100.00"));
        assert_eq!(money("100.015").round(RoundingMode::Bankers), money("100.02"));
        assert_eq!(money("-100.005").round(RoundingMode::Bankers), money("-100.00"));
    }

    #[test]
    fn test_round_pads_scale() {
        assert_eq!(money("150").round(RoundingMode::HalfUp).to_string(), "150.00");
        assert_eq!(money("1.5").round(RoundingMode::HalfUp).to_string(), "1.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = money("10.00");
        let b = money("5.25");

        assert_eq!(a + b, money("15.25"));
        assert_eq!(a - b, money("4.75"));
        assert_eq!(-b, money("-5.25"));
        assert!((b - a).is_negative());

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc, money("4.75"));
    }

    /// Decimal addition is exact where binary floats drift.
    #[test]
    fn test_no_float_drift() {
        let sum = money("0.1") + money("0.2");
        assert_eq!(sum, money("0.3"));
    }

    #[test]
    fn test_rounding_mode_parsing() {
        assert_eq!("half_up".parse::<RoundingMode>().unwrap(), RoundingMode::HalfUp);
        assert_eq!("HALF-UP".parse::<RoundingMode>().unwrap(), RoundingMode::HalfUp);
        assert_eq!("bankers".parse::<RoundingMode>().unwrap(), RoundingMode::Bankers);
        assert_eq!("half_even".parse::<RoundingMode>().unwrap(), RoundingMode::Bankers);
        assert!("ceiling".parse::<RoundingMode>().is_err());
        assert_eq!(RoundingMode::default(), RoundingMode::HalfUp);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&money("200.00")).unwrap();
        assert_eq!(json, "\"200.00\"");
        let back: Money = serde_json::from_str("\"20.00\"").unwrap();
        assert_eq!(back, money("20.00"));
    }
}
