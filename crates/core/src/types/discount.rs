//! Coupon discount policy.
//!
//! The arithmetic from discount type to discount amount lives here as an
//! explicit policy rather than being scattered across coupon call sites.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::money::Money;

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is an absolute amount off the total.
    FixedAmount,
    /// `discount_value` is a percentage (0-100) of the total.
    Percentage,
}

impl DiscountType {
    /// Compute the discount a coupon grants against `total`.
    ///
    /// The result is rounded to 2 decimal places (midpoint away from zero)
    /// and clamped to `[0, total]`, so the payable amount
    /// `total - discount` is never negative.
    #[must_use]
    pub fn discount_amount(self, discount_value: Decimal, total: Money) -> Money {
        let raw = match self {
            Self::FixedAmount => discount_value,
            Self::Percentage => total.amount() * discount_value / Decimal::ONE_HUNDRED,
        };
        let rounded = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Money::new(rounded).min(total)
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedAmount => write!(f, "fixed_amount"),
            Self::Percentage => write!(f, "percentage"),
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed_amount" => Ok(Self::FixedAmount),
            "percentage" => Ok(Self::Percentage),
            _ => Err(format!("invalid discount type: {s}")),
        }
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
    fn test_flat_discount() {
        // One item priced 100 at quantity 2 -> total 200; flat 50 -> payable 150.
        let total = money(10000).times(2);
        let discount = DiscountType::FixedAmount.discount_amount(Decimal::from(50), total);
        assert_eq!(discount, money(5000));
        assert_eq!(total.minus(discount), money(15000));
    }

    #[test]
    fn test_flat_discount_clamped_to_total() {
        let discount = DiscountType::FixedAmount.discount_amount(Decimal::from(500), money(2000));
        assert_eq!(discount, money(2000));
    }

    #[test]
    fn test_percentage_discount() {
        let discount = DiscountType::Percentage.discount_amount(Decimal::from(10), money(20000));
        assert_eq!(discount, money(2000));
    }

    #[test]
    fn test_percentage_rounding_midpoint_away_from_zero() {
        // 15% of 0.30 = 0.045 -> rounds to 0.05
        let discount = DiscountType::Percentage.discount_amount(Decimal::from(15), money(30));
        assert_eq!(discount, money(5));
    }

    #[test]
    fn test_negative_value_yields_zero() {
        let discount = DiscountType::FixedAmount.discount_amount(Decimal::from(-10), money(1000));
        assert_eq!(discount, Money::zero());
    }
}
