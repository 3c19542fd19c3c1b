//! Order domain types.
//!
//! An order freezes a snapshot of cart contents at checkout: line items keep
//! the item name and unit price as they were, and the details row keeps the
//! delivery address, applied coupon, and computed totals.

use serde::Serialize;

use orchard_core::{ItemId, Money, OrderId, OrderItemId, OrderStatus, Timestamps, UserCouponId, UserId};

/// An order header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A frozen order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub item_id: ItemId,
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: i32,
}

/// Delivery and pricing snapshot for one order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub recipient: String,
    pub address_line1: String,
    pub address_line2: String,
    pub postal_code: String,
    pub phone: String,
    pub user_coupon_id: Option<UserCouponId>,
    pub total_amount: Money,
    pub discount_amount: Money,
}

impl OrderDetails {
    /// The payable amount: `total_amount − discount_amount`, never negative.
    #[must_use]
    pub fn final_amount(&self) -> Money {
        self.total_amount.minus(self.discount_amount)
    }
}

/// An order with its lines and details, as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub details: OrderDetails,
    pub final_amount: Money,
}

/// Delivery address collected at checkout.
#[derive(Debug, Clone)]
pub struct DeliveryAddress {
    pub recipient: String,
    pub address_line1: String,
    pub address_line2: String,
    pub postal_code: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn details(total_cents: i64, discount_cents: i64) -> OrderDetails {
        OrderDetails {
            recipient: "A. Customer".to_string(),
            address_line1: "1 Main St".to_string(),
            address_line2: String::new(),
            postal_code: "00000".to_string(),
            phone: "555-0100".to_string(),
            user_coupon_id: None,
            total_amount: Money::new(Decimal::new(total_cents, 2)),
            discount_amount: Money::new(Decimal::new(discount_cents, 2)),
        }
    }

    #[test]
    fn test_final_amount_is_total_minus_discount() {
        assert_eq!(
            details(20000, 5000).final_amount(),
            Money::new(Decimal::new(15000, 2))
        );
    }

    #[test]
    fn test_final_amount_never_negative() {
        assert_eq!(details(2000, 5000).final_amount(), Money::zero());
    }
}
