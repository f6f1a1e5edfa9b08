//! # Totals Calculator
//!
//! Folds line items into a subtotal and a tax total.
//!
//! ## Rounding Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Items are rounded individually, then summed:                          │
//! │                                                                         │
//! │    acc = 0.00                                                          │
//! │    for item in items:                                                  │
//! │        acc = round(acc + round(item.line_amount))                      │
//! │                                                                         │
//! │  [100.005, 50.00]  →  100.01 + 50.00  =  150.01   (HalfUp)             │
//! │                                                                         │
//! │  Summing first and rounding once would give round(150.005) = 150.01    │
//! │  here too, but diverges as soon as two half-cent lines meet:           │
//! │    [0.005, 0.005]  →  per item: 0.01 + 0.01 = 0.02                     │
//! │                    →  sum first: round(0.010) = 0.01                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bankline_core::calculator::Aggregator;
//! use bankline_core::money::Money;
//! use bankline_core::types::LineItem;
//!
//! let items = vec![
//!     LineItem::new("100.005".parse().unwrap(), "10.00".parse().unwrap()),
//!     LineItem::new("50.00".parse().unwrap(), "5.00".parse().unwrap()),
//! ];
//!
//! let calc = Aggregator::default();
//! assert_eq!(calc.sub_total(&items), Money::new(15001, 2));
//! assert_eq!(calc.total_tax(&items), Money::new(1500, 2));
//! assert_eq!(calc.total(&items), Money::new(16501, 2));
//! ```

use crate::money::{Money, RoundingMode};
use crate::types::LineAmounts;

/// Stateless line-item folder.
///
/// Holds only the rounding mode, so one calculator applies one convention
/// to every rounding it performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregator {
    rounding: RoundingMode,
}

impl Aggregator {
    pub const fn new(rounding: RoundingMode) -> Self {
        Aggregator { rounding }
    }

    #[inline]
    pub const fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Sum of line amounts, each rounded to 2 places. Empty input is `0.00`.
    pub fn sub_total<I>(&self, items: I) -> Money
    where
        I: IntoIterator,
        I::Item: LineAmounts,
    {
        self.fold(items, |item| item.line_amount())
    }

    /// Sum of tax amounts, each rounded to 2 places. Empty input is `0.00`.
    pub fn total_tax<I>(&self, items: I) -> Money
    where
        I: IntoIterator,
        I::Item: LineAmounts,
    {
        self.fold(items, |item| item.tax_amount())
    }

    /// `sub_total + total_tax` over the same items (tax-exclusive view).
    pub fn total<I>(&self, items: I) -> Money
    where
        I: IntoIterator,
        I::Item: LineAmounts,
        I::IntoIter: Clone,
    {
        let iter = items.into_iter();
        self.sub_total(iter.clone()) + self.total_tax(iter)
    }

    fn fold<I, F>(&self, items: I, amount: F) -> Money
    where
        I: IntoIterator,
        I::Item: LineAmounts,
        F: Fn(&I::Item) -> Money,
    {
        items.into_iter().fold(Money::zero(), |acc, item| {
            (acc + amount(&item).round(self.rounding)).round(self.rounding)
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn item(line: &str, tax: &str) -> LineItem {
        LineItem::new(money(line), money(tax))
    }

    #[test]
    fn test_empty_is_zero() {
        let calc = Aggregator::default();
        let items: Vec<LineItem> = Vec::new();
        assert_eq!(calc.sub_total(&items), Money::zero());
        assert_eq!(calc.total_tax(&items), Money::zero());
        assert_eq!(calc.sub_total(&items).to_string(), "0.00");
    }

    #[test]
    fn test_half_up_rounds_each_item() {
        let calc = Aggregator::new(RoundingMode::HalfUp);
        let items = vec![item("100.005", "10.00"), item("50.00", "5.00")];

        assert_eq!(calc.sub_total(&items), money("150.01"));
        assert_eq!(calc.total_tax(&items), money("15.00"));
        assert_eq!(calc.total(&items), money("165.01"));
    }

    #[test]
    fn test_bankers_rounds_each_item() {
        let calc = Aggregator::new(RoundingMode::Bankers);
        let items = vec![item("100.005", "10.00"), item("50.00", "5.00")];

        assert_eq!(calc.sub_total(&items), money("150.00"));
    }

    /// Two half-cent lines: per-item rounding keeps both cents.
    #[test]
    fn test_items_rounded_before_summing() {
        let calc = Aggregator::default();
        let items = vec![item("0.005", "0.005"), item("0.005", "0.005")];

        assert_eq!(calc.sub_total(&items), money("0.02"));
        assert_eq!(calc.total_tax(&items), money("0.02"));
    }

    #[test]
    fn test_negative_lines() {
        let calc = Aggregator::default();
        let items = vec![item("-20.004", "-2.005"), item("5.00", "0.50")];

        assert_eq!(calc.sub_total(&items), money("-15.00"));
        assert_eq!(calc.total_tax(&items), money("-1.51"));
    }

    #[test]
    fn test_accepts_owned_iterators() {
        let calc = Aggregator::default();
        let items = vec![item("1.111", "0.111"), item("2.222", "0.222")];

        assert_eq!(calc.sub_total(items.iter()), money("3.33"));
        assert_eq!(calc.total_tax(items), money("0.33"));
    }
}
