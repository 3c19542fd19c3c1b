//! Response envelopes shared by all route handlers.
//!
//! Mutations return `{statusCode, statusMessage}`; list endpoints return
//! `{content, currentPage, totalPages, totalItems}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Default page size when the client does not specify one.
const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on the page size a client may request.
const MAX_PAGE_SIZE: u32 = 100;

/// Simple status envelope for mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status_code: u16,
    pub status_message: String,
}

impl StatusResponse {
    /// 200 OK envelope.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            status_message: message.into(),
        }
    }

    /// 201 Created envelope.
    #[must_use]
    pub fn created(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::CREATED.as_u16(),
            status_message: message.into(),
        }
    }
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> PageResponse<T> {
    /// Assemble a page envelope from a fetched slice and the total row count.
    #[must_use]
    pub fn new(content: Vec<T>, page: &PageQuery, total_items: u64) -> Self {
        let size = u64::from(page.size());
        let total_pages = u32::try_from(total_items.div_ceil(size)).unwrap_or(u32::MAX);
        Self {
            content,
            current_page: page.page(),
            total_pages,
            total_items,
        }
    }
}

/// Pagination query parameters (`?page=&size=`), 0-indexed.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PageQuery {
    page: Option<u32>,
    size: Option<u32>,
}

impl PageQuery {
    /// The requested page, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    /// The requested page size, clamped to `1..=100`.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size())
    }

    /// SQL `OFFSET` for this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page()) * i64::from(self.size())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page_query(page: u32, size: u32) -> PageQuery {
        PageQuery {
            page: Some(page),
            size: Some(size),
        }
    }

    #[test]
    fn test_page_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 0);
        assert_eq!(q.size(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(page_query(0, 0).size(), 1);
        assert_eq!(page_query(0, 10_000).size(), 100);
    }

    #[test]
    fn test_offset_math() {
        let q = page_query(3, 25);
        assert_eq!(q.limit(), 25);
        assert_eq!(q.offset(), 75);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let q = page_query(0, 20);
        let page = PageResponse::new(vec![1, 2, 3], &q, 41);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 41);
    }

    #[test]
    fn test_envelope_field_names() {
        let q = page_query(1, 2);
        let page = PageResponse::new(vec!["a"], &q, 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalItems"], 3);
        assert!(json.get("content").is_some());
    }

    #[test]
    fn test_status_envelope() {
        let json = serde_json::to_value(StatusResponse::created("item created")).unwrap();
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["statusMessage"], "item created");
    }
}
