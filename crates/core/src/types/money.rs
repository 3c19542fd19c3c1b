//! Monetary amounts backed by decimal arithmetic.

use core::fmt;
use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative monetary amount in the store's currency.
///
/// Backed by [`rust_decimal::Decimal`] so that cart totals and discounts are
/// exact. Arithmetic that could produce a negative amount saturates at zero
/// instead; invalid money never exists as a value.
///
/// ```
/// use orchard_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(10000, 2)); // 100.00
/// let total = price.times(2);
/// assert_eq!(total, Money::new(Decimal::new(20000, 2)));
/// assert_eq!(Money::zero().minus(price), Money::zero());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a new amount. Negative inputs are clamped to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self(Decimal::ZERO)
        } else {
            Self(amount)
        }
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Add another amount.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Subtract another amount, saturating at zero.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Whole currency units, truncated. Used for loyalty point awards.
    #[must_use]
    pub fn whole_units(&self) -> i64 {
        self.0.trunc().try_into().unwrap_or(0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Self::plus)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    #[test]
    fn test_negative_input_clamps_to_zero() {
        assert_eq!(Money::new(Decimal::new(-100, 2)), Money::zero());
    }

    #[test]
    fn test_minus_saturates() {
        assert_eq!(money(500).minus(money(800)), Money::zero());
        assert_eq!(money(800).minus(money(500)), money(300));
    }

    #[test]
    fn test_times_quantity() {
        assert_eq!(money(10000).times(2), money(20000));
        assert_eq!(money(10000).times(0), Money::zero());
    }

    #[test]
    fn test_sum_over_lines() {
        let total: Money = [money(10000).times(2), money(2500).times(4)]
            .into_iter()
            .sum();
        assert_eq!(total, money(30000));
    }

    #[test]
    fn test_whole_units() {
        assert_eq!(money(15075).whole_units(), 150);
        assert_eq!(Money::zero().whole_units(), 0);
    }
}
