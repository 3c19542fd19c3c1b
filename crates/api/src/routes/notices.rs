//! Notice handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use orchard_core::{NoticeId, Permission, UserNoticeId};

use crate::db::NoticeRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::notice::{Notice, UserNotice};
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the notices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notices", get(my_notices))
        .route("/api/notices/{id}/read", post(mark_read))
        .route("/api/admin/notices", get(list_notices).post(create_notice))
        .route("/api/admin/notices/{id}", axum::routing::delete(delete_notice))
}

/// The caller's notices, paginated.
pub async fn my_notices(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<UserNotice>>> {
    let (notices, total) = NoticeRepository::new(state.pool())
        .list_for_user(user.id, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(notices, &page, total)))
}

/// Mark one of the caller's notices as read.
pub async fn mark_read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserNoticeId>,
) -> Result<StatusResponse> {
    let marked = NoticeRepository::new(state.pool())
        .mark_read(id, user.id)
        .await?;
    if !marked {
        return Err(AppError::NotFound(format!("notice {id}")));
    }

    Ok(StatusResponse::ok("notice marked read"))
}

/// Notice creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateNoticeRequest {
    pub title: String,
    pub content: String,
}

/// Create a notice and broadcast it to every user (admin).
pub async fn create_notice(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateNoticeRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageNotices)?;

    let (notice, reached) = NoticeRepository::new(state.pool())
        .create_broadcast(&body.title, &body.content)
        .await?;

    tracing::info!(notice_id = %notice.id, reached, "notice broadcast");
    Ok(StatusResponse::created(format!(
        "notice broadcast to {reached} users"
    )))
}

/// List notices (admin).
pub async fn list_notices(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Notice>>> {
    admin.require(Permission::ManageNotices)?;

    let (notices, total) = NoticeRepository::new(state.pool())
        .list(page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(notices, &page, total)))
}

/// Delete a notice and its per-user copies (admin).
pub async fn delete_notice(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<NoticeId>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageNotices)?;

    if !NoticeRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(format!("notice {id}")));
    }

    Ok(StatusResponse::ok("notice deleted"))
}
