//! Category handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use orchard_core::{CategoryId, ItemId, Permission};

use crate::db::{CategoryRepository, ItemRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::category::Category;
use crate::models::item::Item;
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}/items", get(items_in_category))
        .route("/api/admin/categories", post(create_category))
        .route(
            "/api/admin/categories/{id}",
            axum::routing::patch(update_category).delete(delete_category),
        )
        .route(
            "/api/admin/categories/{id}/items/{item_id}",
            post(attach_item).delete(detach_item),
        )
}

/// All categories, alphabetical.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Valid items attached to a category, paginated.
pub async fn items_in_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Item>>> {
    CategoryRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    let (items, total) = ItemRepository::new(state.pool())
        .list_by_category(id, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(items, &page, total)))
}

/// Category creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Create a category (admin).
pub async fn create_category(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    CategoryRepository::new(state.pool())
        .create(&body.name, &body.description)
        .await?;

    Ok(StatusResponse::created("category created"))
}

/// Category update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Rename or re-describe a category (admin).
pub async fn update_category(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    CategoryRepository::new(state.pool())
        .update(id, body.name.as_deref(), body.description.as_deref())
        .await?;

    Ok(StatusResponse::ok("category updated"))
}

/// Delete a category (admin). Refused while items are attached.
pub async fn delete_category(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    let repo = CategoryRepository::new(state.pool());
    let attached = repo.item_count(id).await?;
    if attached > 0 {
        return Err(AppError::HasRelatedEntities(format!(
            "category {id} still has {attached} attached items"
        )));
    }

    if !repo.delete(id).await? {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    Ok(StatusResponse::ok("category deleted"))
}

/// Attach an item to a category (admin).
pub async fn attach_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CategoryId, ItemId)>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    CategoryRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
    ItemRepository::new(state.pool())
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

    CategoryRepository::new(state.pool())
        .attach_item(id, item_id)
        .await?;

    Ok(StatusResponse::created("item attached to category"))
}

/// Detach an item from a category (admin).
pub async fn detach_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CategoryId, ItemId)>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    let detached = CategoryRepository::new(state.pool())
        .detach_item(id, item_id)
        .await?;
    if !detached {
        return Err(AppError::NotFound(format!(
            "item {item_id} is not attached to category {id}"
        )));
    }

    Ok(StatusResponse::ok("item detached from category"))
}
