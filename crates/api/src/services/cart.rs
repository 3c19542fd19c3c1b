//! Cart pricing flow.
//!
//! Every mutation runs as: lock cart → validate against current stock →
//! mutate the line → recompute the persisted total, all in one transaction.
//! A failed validation rolls the whole thing back, leaving the cart exactly
//! as it was.

use sqlx::PgPool;

use orchard_core::{ItemId, Money, UserId};

use crate::db::{CartRepository, RepositoryError, carts, items};
use crate::error::{AppError, FieldError, Result};
use crate::models::cart::CartView;

/// Service for cart mutations and reads.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's cart with its lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user has no cart.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView> {
        let repo = CartRepository::new(self.pool);
        let cart = repo.find_by_user(user_id).await.map_err(not_found_cart)?;
        let lines = repo.lines(cart.id).await?;

        Ok(CartView {
            id: cart.id,
            estimated_total: cart.estimated_total,
            lines,
        })
    }

    /// Add an item to the cart, incrementing the line if one exists.
    ///
    /// The unit price is captured on first add. The combined line quantity
    /// must not exceed the item's current stock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a missing or invalidated item and
    /// `AppError::InvalidOperation` when the requested quantity exceeds
    /// stock.
    pub async fn add_item(&self, user_id: UserId, item_id: ItemId, quantity: i32) -> Result<Money> {
        validate_quantity(quantity)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let cart_id = carts::lock_by_user(&mut tx, user_id)
            .await
            .map_err(not_found_cart)?;

        let item = items::fetch_basics(&mut tx, item_id)
            .await?
            .filter(|i| i.is_valid)
            .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

        let existing = carts::line_quantity(&mut tx, cart_id, item_id).await?.unwrap_or(0);
        let requested = existing.saturating_add(quantity);
        if requested > item.stock {
            return Err(AppError::InvalidOperation(format!(
                "requested quantity {requested} exceeds stock {} for item '{}'",
                item.stock, item.name
            )));
        }

        carts::upsert_line(&mut tx, cart_id, item_id, quantity, item.price).await?;
        let total = carts::recompute_total(&mut tx, cart_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::debug!(%user_id, %item_id, quantity, %total, "cart line added");
        Ok(total)
    }

    /// Set an existing line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the cart has no line for the item and
    /// `AppError::InvalidOperation` when the quantity exceeds stock.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quantity: i32,
    ) -> Result<Money> {
        validate_quantity(quantity)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let cart_id = carts::lock_by_user(&mut tx, user_id)
            .await
            .map_err(not_found_cart)?;

        let item = items::fetch_basics(&mut tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

        if quantity > item.stock {
            return Err(AppError::InvalidOperation(format!(
                "requested quantity {quantity} exceeds stock {} for item '{}'",
                item.stock, item.name
            )));
        }

        if !carts::set_line_quantity(&mut tx, cart_id, item_id, quantity).await? {
            return Err(AppError::NotFound(format!("cart line for item {item_id}")));
        }
        let total = carts::recompute_total(&mut tx, cart_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(total)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the cart has no line for the item.
    pub async fn remove_item(&self, user_id: UserId, item_id: ItemId) -> Result<Money> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let cart_id = carts::lock_by_user(&mut tx, user_id)
            .await
            .map_err(not_found_cart)?;

        if !carts::delete_line(&mut tx, cart_id, item_id).await? {
            return Err(AppError::NotFound(format!("cart line for item {item_id}")));
        }
        let total = carts::recompute_total(&mut tx, cart_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(total)
    }
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::Validation(vec![FieldError::new(
            "quantity",
            "must be at least 1",
        )]));
    }
    Ok(())
}

fn not_found_cart(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("cart".to_string()),
        other => AppError::Database(other),
    }
}
