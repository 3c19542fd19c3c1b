//! Inquiry domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{InquiryId, ItemId, Timestamps, UserId};

/// A user's question about an item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: InquiryId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub title: String,
    pub content: String,
    pub is_resolved: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// The admin response that resolved an inquiry. At most one per inquiry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub responder_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// An inquiry together with its response, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryView {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub response: Option<InquiryResponse>,
}
