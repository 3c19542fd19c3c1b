//! Cart repository.
//!
//! The cart service composes the connection-level functions here inside a
//! single transaction, so a line mutation and the total recomputation either
//! both land or neither does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{CartId, CartItemId, ItemId, Money, Timestamps, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartLine};

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i64,
    user_id: i64,
    estimated_total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            estimated_total: Money::new(row.estimated_total),
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        }
    }
}

/// Internal row type for cart line queries (joined with items for the name).
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    item_id: i64,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            item_id: ItemId::new(row.item_id),
            item_name: row.item_name,
            quantity: row.quantity,
            unit_price: Money::new(row.unit_price),
        }
    }
}

/// Repository for cart reads.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart. Every user has one from sign-up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no cart row.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, estimated_total, created_at, updated_at
             FROM carts WHERE user_id = $1",
        )
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// The cart's lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id, ci.item_id, i.name AS item_name, ci.quantity, ci.unit_price
             FROM cart_items ci
             JOIN items i ON i.id = ci.item_id
             WHERE ci.cart_id = $1
             ORDER BY ci.id",
        )
        .bind(cart_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Lock a user's cart row for the rest of the transaction and return its ID.
///
/// Serializes concurrent mutations of the same cart, which keeps the stored
/// total consistent with the lines.
pub(crate) async fn lock_by_user(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<CartId, RepositoryError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
            .bind(user_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

    row.map(|(id,)| CartId::new(id)).ok_or(RepositoryError::NotFound)
}

/// The current quantity of a line, if the cart has one for this item.
pub(crate) async fn line_quantity(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: ItemId,
) -> Result<Option<i32>, RepositoryError> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM cart_items WHERE cart_id = $1 AND item_id = $2")
            .bind(cart_id.as_i64())
            .bind(item_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.map(|(q,)| q))
}

/// Insert a line or add to an existing line's quantity. The unit price is
/// captured on first insert and kept on subsequent adds.
pub(crate) async fn upsert_line(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: ItemId,
    quantity: i32,
    unit_price: Money,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO cart_items (cart_id, item_id, quantity, unit_price)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (cart_id, item_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                       updated_at = now()",
    )
    .bind(cart_id.as_i64())
    .bind(item_id.as_i64())
    .bind(quantity)
    .bind(unit_price.amount())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Set an existing line's quantity. Returns `false` if there is no such line.
pub(crate) async fn set_line_quantity(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: ItemId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE cart_items SET quantity = $3, updated_at = now()
         WHERE cart_id = $1 AND item_id = $2",
    )
    .bind(cart_id.as_i64())
    .bind(item_id.as_i64())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a line. Returns `false` if there is no such line.
pub(crate) async fn delete_line(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: ItemId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND item_id = $2")
        .bind(cart_id.as_i64())
        .bind(item_id.as_i64())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Recompute and persist the cart's estimated total from its lines.
///
/// This is the invariant keeper: it must run inside every transaction that
/// touched the cart's lines.
pub(crate) async fn recompute_total(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<Money, RepositoryError> {
    let (total,): (Decimal,) = sqlx::query_as(
        "UPDATE carts
         SET estimated_total = COALESCE(
                 (SELECT SUM(unit_price * quantity) FROM cart_items WHERE cart_id = $1), 0),
             updated_at = now()
         WHERE id = $1
         RETURNING estimated_total",
    )
    .bind(cart_id.as_i64())
    .fetch_one(&mut *conn)
    .await?;

    Ok(Money::new(total))
}

/// Empty the cart and zero its total (after checkout).
pub(crate) async fn clear(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id.as_i64())
        .execute(&mut *conn)
        .await?;

    sqlx::query("UPDATE carts SET estimated_total = 0, updated_at = now() WHERE id = $1")
        .bind(cart_id.as_i64())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// The cart's lines, for use inside a transaction.
pub(crate) async fn lines_in_tx(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT ci.id, ci.item_id, i.name AS item_name, ci.quantity, ci.unit_price
         FROM cart_items ci
         JOIN items i ON i.id = ci.item_id
         WHERE ci.cart_id = $1
         ORDER BY ci.id",
    )
    .bind(cart_id.as_i64())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}
