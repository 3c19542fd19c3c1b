//! Wishlist repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use orchard_core::{ItemId, Money, UserId, WishItemId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::wishlist::WishItem;

/// Internal row type for wishlist entries joined with catalog data.
#[derive(Debug, sqlx::FromRow)]
struct WishItemRow {
    id: i64,
    item_id: i64,
    item_name: String,
    price: Decimal,
    is_valid: bool,
    created_at: DateTime<Utc>,
}

impl From<WishItemRow> for WishItem {
    fn from(row: WishItemRow) -> Self {
        Self {
            id: WishItemId::new(row.id),
            item_id: ItemId::new(row.item_id),
            item_name: row.item_name,
            price: Money::new(row.price),
            is_valid: row.is_valid,
            added_at: row.created_at,
        }
    }
}

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The ID of a user's wishlist. Every user has one from sign-up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no wishlist row.
    async fn wishlist_id(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM wishlists WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.map(|(id,)| id).ok_or(RepositoryError::NotFound)
    }

    /// The items on a user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<WishItem>, RepositoryError> {
        let wishlist_id = self.wishlist_id(user_id).await?;

        let rows = sqlx::query_as::<_, WishItemRow>(
            "SELECT w.id, w.item_id, i.name AS item_name, i.price, i.is_valid, w.created_at
             FROM wish_items w
             JOIN items i ON i.id = w.item_id
             WHERE w.wishlist_id = $1
             ORDER BY w.id DESC",
        )
        .bind(wishlist_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add an item to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the item is already on the list.
    pub async fn add(&self, user_id: UserId, item_id: ItemId) -> Result<(), RepositoryError> {
        let wishlist_id = self.wishlist_id(user_id).await?;

        sqlx::query("INSERT INTO wish_items (wishlist_id, item_id) VALUES ($1, $2)")
            .bind(wishlist_id)
            .bind(item_id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "item already on wishlist"))?;

        Ok(())
    }

    /// Remove an item from a user's wishlist.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was on the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let wishlist_id = self.wishlist_id(user_id).await?;

        let result = sqlx::query("DELETE FROM wish_items WHERE wishlist_id = $1 AND item_id = $2")
            .bind(wishlist_id)
            .bind(item_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
