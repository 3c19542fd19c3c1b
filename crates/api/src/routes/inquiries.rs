//! Inquiry handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use orchard_core::{InquiryId, ItemId, Permission, Role};

use crate::db::{InquiryRepository, ItemRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::inquiry::InquiryView;
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the inquiries router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/items/{id}/inquiries", post(create_inquiry))
        .route("/api/inquiries", get(my_inquiries))
        .route("/api/inquiries/{id}", get(get_inquiry))
        .route("/api/admin/inquiries", get(all_inquiries))
        .route("/api/admin/inquiries/{id}/response", post(respond))
}

/// Inquiry creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub title: String,
    pub content: String,
}

/// Ask a question about an item.
pub async fn create_inquiry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(body): Json<CreateInquiryRequest>,
) -> Result<StatusResponse> {
    ItemRepository::new(state.pool())
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

    InquiryRepository::new(state.pool())
        .create(user.id, item_id, &body.title, &body.content)
        .await?;

    Ok(StatusResponse::created("inquiry created"))
}

/// The caller's inquiries, paginated.
pub async fn my_inquiries(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<InquiryView>>> {
    let (inquiries, total) = InquiryRepository::new(state.pool())
        .list_by_user(user.id, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(inquiries, &page, total)))
}

/// One inquiry, readable by its owner or an admin.
pub async fn get_inquiry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<InquiryId>,
) -> Result<Json<InquiryView>> {
    let view = InquiryRepository::new(state.pool())
        .find_view(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("inquiry {id}")))?;

    if view.inquiry.user_id != user.id && user.role == Role::User {
        return Err(AppError::NotFound(format!("inquiry {id}")));
    }

    Ok(Json(view))
}

/// Resolution filter for the admin listing.
#[derive(Debug, Deserialize)]
pub struct ResolvedFilter {
    pub resolved: Option<bool>,
}

/// All inquiries, optionally filtered by resolution state (admin).
pub async fn all_inquiries(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<ResolvedFilter>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<InquiryView>>> {
    admin.require(Permission::RespondInquiries)?;

    let (inquiries, total) = InquiryRepository::new(state.pool())
        .list_all(filter.resolved, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(inquiries, &page, total)))
}

/// Response request body.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub content: String,
}

/// Respond to an inquiry and mark it resolved (admin). One response each.
pub async fn respond(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<InquiryId>,
    Json(body): Json<RespondRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::RespondInquiries)?;

    InquiryRepository::new(state.pool())
        .respond(id, admin.id, &body.content)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::InvalidOperation(msg),
            other => AppError::from(other),
        })?;

    Ok(StatusResponse::created("inquiry resolved"))
}
