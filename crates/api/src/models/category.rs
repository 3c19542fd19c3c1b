//! Category domain types.

use serde::Serialize;

use orchard_core::{CategoryId, Timestamps};

/// A named item grouping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
