//! Cart domain types.

use serde::Serialize;

use orchard_core::{CartId, CartItemId, ItemId, Money, Timestamps, UserId};

/// A user's cart. `estimated_total` always equals the sum of
/// `unit_price × quantity` over the cart's lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub estimated_total: Money,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// One cart line: an item, a quantity, and the unit price captured when the
/// item was first added.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

impl CartLine {
    /// This line's contribution to the cart total.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A cart together with its lines, as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub estimated_total: Money,
    pub lines: Vec<CartLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_line_subtotal() {
        let line = CartLine {
            id: CartItemId::new(1),
            item_id: ItemId::new(1),
            item_name: "widget".to_string(),
            quantity: 3,
            unit_price: Money::new(Decimal::new(2500, 2)),
        };
        assert_eq!(line.subtotal(), Money::new(Decimal::new(7500, 2)));
    }
}
