//! Coupon domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use orchard_core::{CouponId, DiscountType, Money, Timestamps, UserCouponId, UserId};

/// A coupon definition. Read-only after creation; users hold it through
/// [`UserCoupon`] rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub expires_at: DateTime<Utc>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Coupon {
    /// Whether the coupon has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// The discount this coupon grants against `total`, per the discount
    /// policy table.
    #[must_use]
    pub fn discount_against(&self, total: Money) -> Money {
        self.discount_type
            .discount_amount(self.discount_value, total)
    }
}

/// A coupon granted to one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCoupon {
    pub id: UserCouponId,
    pub user_id: UserId,
    pub coupon_id: CouponId,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

/// A user's coupon joined with its definition, for listing and validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCouponView {
    #[serde(flatten)]
    pub grant: UserCoupon,
    pub coupon: Coupon,
}

impl UserCouponView {
    /// A coupon is usable while it is unused and unexpired.
    #[must_use]
    pub fn usable(&self, now: DateTime<Utc>) -> bool {
        !self.grant.is_used && !self.coupon.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coupon_expiring(expires_at: DateTime<Utc>) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            name: "welcome".to_string(),
            discount_type: DiscountType::FixedAmount,
            discount_value: Decimal::from(50),
            expires_at,
            timestamps: Timestamps::new(expires_at, expires_at),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let deadline = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single().expect("valid");
        let coupon = coupon_expiring(deadline);
        assert!(!coupon.is_expired(deadline - chrono::Duration::seconds(1)));
        assert!(coupon.is_expired(deadline));
    }

    #[test]
    fn test_usable_requires_unused_and_unexpired() {
        let deadline = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single().expect("valid");
        let before = deadline - chrono::Duration::days(1);
        let view = UserCouponView {
            grant: UserCoupon {
                id: UserCouponId::new(1),
                user_id: UserId::new(1),
                coupon_id: CouponId::new(1),
                is_used: false,
                used_at: None,
            },
            coupon: coupon_expiring(deadline),
        };
        assert!(view.usable(before));

        let mut used = view.clone();
        used.grant.is_used = true;
        assert!(!used.usable(before));
        assert!(!view.usable(deadline));
    }
}
