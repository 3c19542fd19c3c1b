//! Catalog item repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{ItemId, Money, Timestamps};

use super::RepositoryError;
use crate::models::item::{CreateItemInput, Item, RatingSummary, UpdateItemInput};

/// Internal row type for item queries.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    keywords: Vec<String>,
    is_valid: bool,
    rating_sum: i64,
    rating_count: i64,
    rating_average: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::new(row.price),
            stock: row.stock,
            keywords: row.keywords,
            is_valid: row.is_valid,
            rating: RatingSummary {
                rating_sum: row.rating_sum,
                rating_count: row.rating_count,
                rating_average: row.rating_average,
            },
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        }
    }
}

const ITEM_COLUMNS: &str = "id, name, description, price, stock, keywords, is_valid, \
     rating_sum, rating_count, rating_average, created_at, updated_at";

/// Repository for catalog item operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a catalog item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CreateItemInput) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items (name, description, price, stock, keywords)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price.amount())
        .bind(input.stock)
        .bind(&input.keywords)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List items, newest first.
    ///
    /// `include_invalid` is for the admin listing; the public catalog only
    /// shows valid items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        include_invalid: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Item>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE is_valid OR $1
             ORDER BY id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(include_invalid)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items WHERE is_valid OR $1")
            .bind(include_invalid)
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Search valid items by name or keyword tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Item>, u64), RepositoryError> {
        let pattern = format!("%{keyword}%");

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE is_valid AND (name ILIKE $1 OR $2 = ANY (keywords))
             ORDER BY id DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(&pattern)
        .bind(keyword)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM items
             WHERE is_valid AND (name ILIKE $1 OR $2 = ANY (keywords))",
        )
        .bind(&pattern)
        .bind(keyword)
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Valid items attached to a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: orchard_core::CategoryId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Item>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE is_valid AND id IN (SELECT item_id FROM category_items WHERE category_id = $1)
             ORDER BY id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(category_id.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM items
             WHERE is_valid AND id IN (SELECT item_id FROM category_items WHERE category_id = $1)",
        )
        .bind(category_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Update an item. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update(
        &self,
        id: ItemId,
        input: &UpdateItemInput,
    ) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 stock = COALESCE($5, stock),
                 keywords = COALESCE($6, keywords),
                 is_valid = COALESCE($7, is_valid),
                 updated_at = now()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price.map(|p| p.amount()))
        .bind(input.stock)
        .bind(input.keywords.as_deref())
        .bind(input.is_valid)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Whether any order line still references this item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_order_references(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM order_items WHERE item_id = $1)")
                .bind(id.as_i64())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Delete an item. Cart lines holding it cascade, so the affected
    /// carts' totals are recomputed in the same transaction.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let affected_carts: Vec<(i64,)> =
            sqlx::query_as("SELECT cart_id FROM cart_items WHERE item_id = $1")
                .bind(id.as_i64())
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for (cart_id,) in affected_carts {
            super::carts::recompute_total(&mut tx, orchard_core::CartId::new(cart_id)).await?;
        }

        tx.commit().await?;

        Ok(true)
    }
}

/// The fields cart and order flows need from an item, read inside their
/// transaction.
#[derive(Debug)]
pub(crate) struct ItemBasics {
    pub name: String,
    pub price: Money,
    pub stock: i32,
    pub is_valid: bool,
}

/// Read an item's pricing/stock fields inside a transaction.
pub(crate) async fn fetch_basics(
    conn: &mut PgConnection,
    item_id: ItemId,
) -> Result<Option<ItemBasics>, RepositoryError> {
    let row: Option<(String, Decimal, i32, bool)> =
        sqlx::query_as("SELECT name, price, stock, is_valid FROM items WHERE id = $1")
            .bind(item_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.map(|(name, price, stock, is_valid)| ItemBasics {
        name,
        price: Money::new(price),
        stock,
        is_valid,
    }))
}

/// Atomically decrement stock if enough remains.
///
/// Returns `false` when the item is missing or the stock is insufficient;
/// the conditional update is what makes concurrent checkouts safe.
pub(crate) async fn decrement_stock(
    conn: &mut PgConnection,
    item_id: ItemId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE items SET stock = stock - $2, updated_at = now()
         WHERE id = $1 AND stock >= $2",
    )
    .bind(item_id.as_i64())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Give stock back after a cancellation.
pub(crate) async fn restore_stock(
    conn: &mut PgConnection,
    item_id: ItemId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE items SET stock = stock + $2, updated_at = now()
         WHERE id = $1",
    )
    .bind(item_id.as_i64())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Fold a rating change into an item's aggregates.
///
/// `sum_delta`/`count_delta` express creation (`+rating`, `+1`), an edit
/// (`new - old`, `0`), or a deletion (`-rating`, `-1`).
pub(crate) async fn apply_rating_delta(
    conn: &mut PgConnection,
    item_id: ItemId,
    sum_delta: i64,
    count_delta: i64,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE items
         SET rating_sum = rating_sum + $2,
             rating_count = rating_count + $3,
             rating_average = CASE
                 WHEN rating_count + $3 = 0 THEN 0
                 ELSE round((rating_sum + $2)::numeric / (rating_count + $3), 2)
             END,
             updated_at = now()
         WHERE id = $1",
    )
    .bind(item_id.as_i64())
    .bind(sum_delta)
    .bind(count_delta)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
