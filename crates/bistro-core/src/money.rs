//! # Money Module
//!
//! Provides the `Money` type for menu prices, order totals and payments.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer units                                            │
//! │    The menu is priced in whole pesos (12500 = $12.500), so every        │
//! │    amount is an i64 count of the smallest unit and arithmetic is exact │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::Money;
//!
//! let burger = Money::from_units(12500);
//! let line = burger * 2;
//! assert_eq!(line.units(), 25000);
//! assert_eq!(line.to_string(), "$25.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes as a bare number so the UI keeps receiving `total: 25000`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Price × quantity for a line item.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Formats with a dot as thousands separator: `$12.500`, `-$3.800`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}", sign, grouped)
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

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_units(0).to_string(), "$0");
        assert_eq!(Money::from_units(950).to_string(), "$950");
        assert_eq!(Money::from_units(4500).to_string(), "$4.500");
        assert_eq!(Money::from_units(25000).to_string(), "$25.000");
        assert_eq!(Money::from_units(1_234_567).to_string(), "$1.234.567");
        assert_eq!(Money::from_units(-3800).to_string(), "-$3.800");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(12500);
        let b = Money::from_units(6500);

        assert_eq!((a + b).units(), 19000);
        assert_eq!((a - b).units(), 6000);
        assert_eq!((a * 3).units(), 37500);

        let total: Money = [a, b, Money::from_units(4500)].into_iter().sum();
        assert_eq!(total.units(), 23500);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_units(25000)).unwrap();
        assert_eq!(json, "25000");
        let back: Money = serde_json::from_str("8500").unwrap();
        assert_eq!(back, Money::from_units(8500));
    }
}
