//! Review domain types.

use serde::Serialize;

use orchard_core::{ItemId, ReviewId, Timestamps, UserId};

/// A user's review of an item. One per (user, item).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: i32,
    pub content: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
