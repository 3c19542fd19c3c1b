//! Order repository.
//!
//! Orders are written exactly once, at checkout, inside the order service's
//! transaction; afterwards only their status moves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{
    ItemId, Money, OrderId, OrderItemId, OrderStatus, Timestamps, UserCouponId, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::order::{DeliveryAddress, Order, OrderDetails, OrderItem, OrderView};

/// Internal row type for order headers.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = parse_column(&self.status, "status")?;
        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            status,
            timestamps: Timestamps::new(self.created_at, self.updated_at),
        })
    }
}

/// Internal row type for frozen order lines.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    item_id: i64,
    item_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            item_id: ItemId::new(row.item_id),
            item_name: row.item_name,
            unit_price: Money::new(row.unit_price),
            quantity: row.quantity,
        }
    }
}

/// Internal row type for the details snapshot.
#[derive(Debug, sqlx::FromRow)]
struct OrderDetailsRow {
    recipient: String,
    address_line1: String,
    address_line2: String,
    postal_code: String,
    phone: String,
    user_coupon_id: Option<i64>,
    total_amount: Decimal,
    discount_amount: Decimal,
}

impl From<OrderDetailsRow> for OrderDetails {
    fn from(row: OrderDetailsRow) -> Self {
        Self {
            recipient: row.recipient,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            postal_code: row.postal_code,
            phone: row.phone,
            user_coupon_id: row.user_coupon_id.map(UserCouponId::new),
            total_amount: Money::new(row.total_amount),
            discount_amount: Money::new(row.discount_amount),
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, status, created_at, updated_at";

/// Repository for order reads and status changes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_one(self.pool)
            .await?;

        let orders = rows
            .into_iter()
            .map(OrderRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, total.unsigned_abs()))
    }

    /// Get an order header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Get an order with its lines and details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the details row is
    /// missing, since every order is written with one.
    pub async fn find_view(&self, id: OrderId) -> Result<Option<OrderView>, RepositoryError> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, item_id, item_name, unit_price, quantity
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        let details = sqlx::query_as::<_, OrderDetailsRow>(
            "SELECT recipient, address_line1, address_line2, postal_code, phone,
                    user_coupon_id, total_amount, discount_amount
             FROM order_details WHERE order_id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::DataCorruption(format!("order {id} has no details row"))
        })?;

        let details: OrderDetails = details.into();
        let final_amount = details.final_amount();

        Ok(Some(OrderView {
            order,
            items: items.into_iter().map(Into::into).collect(),
            details,
            final_amount,
        }))
    }
}

/// Insert an order header.
pub(crate) async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders (user_id) VALUES ($1) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(user_id.as_i64())
    .fetch_one(&mut *conn)
    .await?;

    row.into_domain()
}

/// Freeze one line onto an order.
pub(crate) async fn insert_order_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    item_id: ItemId,
    item_name: &str,
    unit_price: Money,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO order_items (order_id, item_id, item_name, unit_price, quantity)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(order_id.as_i64())
    .bind(item_id.as_i64())
    .bind(item_name)
    .bind(unit_price.amount())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Write the delivery/pricing snapshot for an order.
pub(crate) async fn insert_order_details(
    conn: &mut PgConnection,
    order_id: OrderId,
    address: &DeliveryAddress,
    user_coupon_id: Option<UserCouponId>,
    total_amount: Money,
    discount_amount: Money,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO order_details
             (order_id, recipient, address_line1, address_line2, postal_code, phone,
              user_coupon_id, total_amount, discount_amount)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order_id.as_i64())
    .bind(&address.recipient)
    .bind(&address.address_line1)
    .bind(&address.address_line2)
    .bind(&address.postal_code)
    .bind(&address.phone)
    .bind(user_coupon_id.map(|c| c.as_i64()))
    .bind(total_amount.amount())
    .bind(discount_amount.amount())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Lock an order header for the rest of the transaction.
pub(crate) async fn find_for_update(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(OrderRow::into_domain).transpose()
}

/// Move an order's status, guarded by the status it is expected to be in.
/// Returns `false` if the order moved under us.
pub(crate) async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE orders SET status = $3, updated_at = now()
         WHERE id = $1 AND status = $2",
    )
    .bind(id.as_i64())
    .bind(from.to_string())
    .bind(to.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// An order's frozen lines, inside a transaction (for restocking).
pub(crate) async fn lines_in_tx(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Vec<OrderItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, item_id, item_name, unit_price, quantity
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id.as_i64())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// An order's details snapshot, inside a transaction (for cancellation).
pub(crate) async fn details_in_tx(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Option<OrderDetails>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderDetailsRow>(
        "SELECT recipient, address_line1, address_line2, postal_code, phone,
                user_coupon_id, total_amount, discount_amount
         FROM order_details WHERE order_id = $1",
    )
    .bind(order_id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Into::into))
}
