//! Catalog item domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use orchard_core::{ItemId, Money, Timestamps};

/// A catalog item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub keywords: Vec<String>,
    pub is_valid: bool,
    #[serde(flatten)]
    pub rating: RatingSummary,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Running review aggregates carried on each item.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub rating_sum: i64,
    pub rating_count: i64,
    pub rating_average: Decimal,
}

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub keywords: Vec<String>,
}

/// Partial update for an item; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i32>,
    pub keywords: Option<Vec<String>>,
    pub is_valid: Option<bool>,
}
