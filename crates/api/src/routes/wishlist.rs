//! Wishlist handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use orchard_core::ItemId;

use crate::db::{ItemRepository, RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::wishlist::WishItem;
use crate::response::StatusResponse;
use crate::state::AppState;

/// Build the wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me/wishlist", get(my_wishlist))
        .route(
            "/api/users/me/wishlist/{item_id}",
            axum::routing::post(add_item).delete(remove_item),
        )
}

/// The caller's wishlist.
pub async fn my_wishlist(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<WishItem>>> {
    let items = WishlistRepository::new(state.pool()).items(user.id).await?;
    Ok(Json(items))
}

/// Add an item to the caller's wishlist.
pub async fn add_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> Result<StatusResponse> {
    ItemRepository::new(state.pool())
        .find_by_id(item_id)
        .await?
        .filter(|i| i.is_valid)
        .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

    WishlistRepository::new(state.pool())
        .add(user.id, item_id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::InvalidOperation(msg),
            other => AppError::from(other),
        })?;

    Ok(StatusResponse::created("item added to wishlist"))
}

/// Remove an item from the caller's wishlist.
pub async fn remove_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> Result<StatusResponse> {
    let removed = WishlistRepository::new(state.pool())
        .remove(user.id, item_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "item {item_id} is not on the wishlist"
        )));
    }

    Ok(StatusResponse::ok("item removed from wishlist"))
}
