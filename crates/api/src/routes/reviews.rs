//! Review handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use orchard_core::{ItemId, ReviewId};

use crate::db::{ItemRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::review::Review;
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/items/{id}/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/api/reviews/{id}",
            axum::routing::patch(update_review).delete(delete_review),
        )
}

/// Review creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub content: String,
}

/// Review an item. One review per user per item.
pub async fn create_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<StatusResponse> {
    validate_rating(body.rating)?;

    ItemRepository::new(state.pool())
        .find_by_id(item_id)
        .await?
        .filter(|i| i.is_valid)
        .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

    ReviewRepository::new(state.pool())
        .create(user.id, item_id, body.rating, &body.content)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::InvalidOperation(msg),
            other => AppError::from(other),
        })?;

    Ok(StatusResponse::created("review created"))
}

/// An item's reviews, paginated.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Review>>> {
    let (reviews, total) = ReviewRepository::new(state.pool())
        .list_by_item(item_id, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(reviews, &page, total)))
}

/// Review update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub content: Option<String>,
}

/// Edit one of the caller's reviews.
pub async fn update_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<StatusResponse> {
    if let Some(rating) = body.rating {
        validate_rating(rating)?;
    }

    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;
    if review.user_id != user.id {
        return Err(AppError::Forbidden(
            "only the author can edit a review".to_string(),
        ));
    }

    repo.update(id, body.rating, body.content.as_deref()).await?;

    Ok(StatusResponse::ok("review updated"))
}

/// Delete one of the caller's reviews.
pub async fn delete_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusResponse> {
    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;
    if review.user_id != user.id {
        return Err(AppError::Forbidden(
            "only the author can delete a review".to_string(),
        ));
    }

    repo.delete(id).await?;

    Ok(StatusResponse::ok("review deleted"))
}

fn validate_rating(rating: i32) -> Result<()> {
    if (1..=5).contains(&rating) {
        return Ok(());
    }
    Err(AppError::Validation(vec![FieldError::new(
        "rating",
        "must be between 1 and 5",
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-1).is_err());
    }
}
