//! Catalog item handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use orchard_core::{ItemId, Money, Permission};

use crate::db::ItemRepository;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::item::{CreateItemInput, Item, UpdateItemInput};
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the items router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items))
        .route("/api/items/search", get(search_items))
        .route("/api/items/{id}", get(get_item))
        .route("/api/admin/items", get(admin_list_items).post(create_item))
        .route(
            "/api/admin/items/{id}",
            get(admin_get_item).patch(update_item).delete(delete_item),
        )
}

/// Public catalog: valid items, paginated.
pub async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Item>>> {
    let (items, total) = ItemRepository::new(state.pool())
        .list(false, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(items, &page, total)))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

/// Search valid items by name or keyword tag.
pub async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Item>>> {
    let (items, total) = ItemRepository::new(state.pool())
        .search(&query.keyword, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(items, &page, total)))
}

/// One item from the public catalog. Invalidated items are hidden.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>> {
    let item = ItemRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .filter(|i| i.is_valid)
        .ok_or_else(|| AppError::NotFound(format!("item {id}")))?;

    Ok(Json(item))
}

/// Item creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Create a catalog item (admin).
pub async fn create_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;
    validate_item_fields(Some(body.name.as_str()), Some(body.price), Some(body.stock))?;

    let item = ItemRepository::new(state.pool())
        .create(&CreateItemInput {
            name: body.name,
            description: body.description,
            price: Money::new(body.price),
            stock: body.stock,
            keywords: body.keywords,
        })
        .await?;

    tracing::info!(item_id = %item.id, "item created");
    Ok(StatusResponse::created("item created"))
}

/// Admin catalog: all items including invalidated ones.
pub async fn admin_list_items(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Item>>> {
    admin.require(Permission::ManageCatalog)?;

    let (items, total) = ItemRepository::new(state.pool())
        .list(true, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(items, &page, total)))
}

/// One item, visible to admins even when invalidated.
pub async fn admin_get_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>> {
    admin.require(Permission::ManageCatalog)?;

    let item = ItemRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {id}")))?;

    Ok(Json(item))
}

/// Item update request body; omitted fields stay unchanged.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub keywords: Option<Vec<String>>,
    pub is_valid: Option<bool>,
}

/// Update an item (admin).
pub async fn update_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;
    validate_item_fields(body.name.as_deref(), body.price, body.stock)?;

    ItemRepository::new(state.pool())
        .update(
            id,
            &UpdateItemInput {
                name: body.name,
                description: body.description,
                price: body.price.map(Money::new),
                stock: body.stock,
                keywords: body.keywords,
                is_valid: body.is_valid,
            },
        )
        .await?;

    Ok(StatusResponse::ok("item updated"))
}

/// Delete an item (admin).
///
/// Refused while order lines still reference the item; invalidate it
/// instead.
pub async fn delete_item(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCatalog)?;

    let repo = ItemRepository::new(state.pool());
    if repo.has_order_references(id).await? {
        return Err(AppError::HasRelatedEntities(format!(
            "item {id} appears in existing orders; mark it invalid instead"
        )));
    }

    if !repo.delete(id).await? {
        return Err(AppError::NotFound(format!("item {id}")));
    }

    tracing::info!(item_id = %id, "item deleted");
    Ok(StatusResponse::ok("item deleted"))
}

fn validate_item_fields(
    name: Option<&str>,
    price: Option<Decimal>,
    stock: Option<i32>,
) -> Result<()> {
    let mut errors = Vec::new();

    if let Some(name) = name
        && name.trim().is_empty()
    {
        errors.push(FieldError::new("name", "must not be empty"));
    }
    if let Some(price) = price
        && price.is_sign_negative()
    {
        errors.push(FieldError::new("price", "must not be negative"));
    }
    if let Some(stock) = stock
        && stock < 0
    {
        errors.push(FieldError::new("stock", "must not be negative"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_fields() {
        assert!(validate_item_fields(Some("Widget"), Some(Decimal::from(10)), Some(5)).is_ok());
        assert!(validate_item_fields(Some(""), None, None).is_err());
        assert!(validate_item_fields(None, Some(Decimal::from(-1)), None).is_err());
        assert!(validate_item_fields(None, None, Some(-3)).is_err());
        // Partial updates validate only the supplied fields.
        assert!(validate_item_fields(None, None, None).is_ok());
    }
}
