//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{ItemId, Money, WishItemId};

/// One item on a user's wishlist, joined with current catalog data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItem {
    pub id: WishItemId,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: Money,
    pub is_valid: bool,
    pub added_at: DateTime<Utc>,
}
