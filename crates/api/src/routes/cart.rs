//! Cart handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use orchard_core::ItemId;

use crate::error::Result;
use crate::middleware::auth::RequireAuth;
use crate::models::cart::CartView;
use crate::response::StatusResponse;
use crate::services::cart::CartService;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me/cart", get(get_cart))
        .route(
            "/api/users/me/cart/{item_id}",
            axum::routing::post(add_item)
                .patch(update_quantity)
                .delete(remove_item),
        )
}

/// The current user's cart with lines and estimated total.
pub async fn get_cart(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).get_cart(user.id).await?;
    Ok(Json(cart))
}

/// Quantity request body for cart mutations.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

/// Add an item to the cart, incrementing an existing line.
pub async fn add_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(body): Json<QuantityRequest>,
) -> Result<StatusResponse> {
    CartService::new(state.pool())
        .add_item(user.id, item_id, body.quantity)
        .await?;

    Ok(StatusResponse::created("item added to cart"))
}

/// Set a cart line's quantity.
pub async fn update_quantity(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(body): Json<QuantityRequest>,
) -> Result<StatusResponse> {
    CartService::new(state.pool())
        .update_quantity(user.id, item_id, body.quantity)
        .await?;

    Ok(StatusResponse::ok("cart line updated"))
}

/// Remove a line from the cart.
pub async fn remove_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> Result<StatusResponse> {
    CartService::new(state.pool())
        .remove_item(user.id, item_id)
        .await?;

    Ok(StatusResponse::ok("cart line removed"))
}
