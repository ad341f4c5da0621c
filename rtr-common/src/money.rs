//! Fixed-point money and percentage arithmetic
//!
//! Monetary figures are held as integer cents and percentages as integer
//! basis points, so every rounding step happens exactly once, at the point of
//! computation, using round-half-away-from-zero. Sums of `Money` values are
//! exact: a rollup always equals the sum of its rounded parts.
//!
//! Both types serialize as plain JSON numbers (`1600.0`, `20.0`) so API
//! consumers see decimal figures.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Integer division rounding half away from zero. `denominator` must be positive.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

/// Round a decimal value to an integer number of `1/scale` units.
///
/// The value is first snapped to micro-units so that binary representation
/// noise (`1.005` being stored as `1.00499999...`) does not flip a half-way
/// case, then rounded half away from zero in integer arithmetic.
fn round_decimal(value: f64, scale: i128) -> i128 {
    let micros = (value * 1_000_000.0).round() as i128;
    div_round_half_away(micros, 1_000_000 / scale)
}

/// Amount of money in the statement currency, stored as cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Convert a decimal amount (e.g. raw usage revenue) to cents, rounding
    /// half away from zero
    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() {
            return Money::ZERO;
        }
        Money(round_decimal(value, 100) as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `round(self x percentage / 100, 2)`
    pub fn percentage_of(self, percentage: Percentage) -> Money {
        let cents = div_round_half_away(
            self.0 as i128 * percentage.basis_points() as i128,
            Percentage::FULL_BASIS_POINTS as i128,
        );
        Money(cents as i64)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(value))
    }
}

/// Percentage with two decimal places of precision, stored as basis points
///
/// `20%` is `2000` basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(i64);

impl Percentage {
    pub const FULL_BASIS_POINTS: i64 = 10_000;
    pub const HUNDRED: Percentage = Percentage(Self::FULL_BASIS_POINTS);

    pub fn from_f64(percent: f64) -> Self {
        if !percent.is_finite() {
            return Percentage(0);
        }
        Percentage(round_decimal(percent, 100) as i64)
    }

    pub const fn from_basis_points(basis_points: i64) -> Self {
        Percentage(basis_points)
    }

    pub const fn basis_points(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// True for `0 <= self <= 100`
    pub fn is_within_bounds(self) -> bool {
        (0..=Self::FULL_BASIS_POINTS).contains(&self.0)
    }
}

impl Add for Percentage {
    type Output = Percentage;

    fn add(self, rhs: Percentage) -> Percentage {
        Percentage(self.0 + rhs.0)
    }
}

impl Sum for Percentage {
    fn sum<I: Iterator<Item = Percentage>>(iter: I) -> Percentage {
        iter.fold(Percentage(0), Add::add)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Percentage::from_f64(value))
    }
}
