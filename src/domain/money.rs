//! Currency amounts
//!
//! The backend sends prices as plain JSON numbers (`3.5`, `10`) and some
//! deployments send DECIMAL columns as strings. Both are read into a
//! [`Decimal`] so cart and report sums are exact.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// An amount of money
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create from whole cents
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// `percent`% of this amount, rounded half away from zero to the cent
    pub fn percent(self, percent: u32) -> Money {
        let scaled = self.0 * Decimal::from(percent) / Decimal::ONE_HUNDRED;
        Money(scaled.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// True when the amount has no fractional part
    pub fn is_whole(self) -> bool {
        self.0.fract().is_zero()
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
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

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.2}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::from_decimal(Decimal::new(35, 1)).to_string(), "3.50");
        assert_eq!(Money::from_cents(1870).to_string(), "18.70");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Money::from_cents(1700).percent(10), Money::from_cents(170));
        assert_eq!(Money::from_cents(5).percent(10), Money::from_cents(1));
        assert_eq!(Money::from_cents(4).percent(10), Money::ZERO);
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let m: Money = serde_json::from_str("10.99").unwrap();
        assert_eq!(m, Money::from_cents(1099));

        let m: Money = serde_json::from_str("\"25.50\"").unwrap();
        assert_eq!(m, Money::from_cents(2550));
    }

    #[test]
    fn test_deserialize_keeps_third_decimal() {
        let m: Money = serde_json::from_str("1.005").unwrap();
        assert_eq!(m.amount(), Decimal::from_str("1.005").unwrap());
        assert_eq!(m.to_string(), "1.01");
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_cents(1870)).unwrap();
        assert_eq!(json, "18.7");
    }

    #[test]
    fn test_whole_amounts() {
        assert!(Money::from_cents(1200).is_whole());
        assert!(!Money::from_cents(1250).is_whole());
    }
}
