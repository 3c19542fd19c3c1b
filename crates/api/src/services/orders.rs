//! Order materialization.
//!
//! Checkout freezes the cart into an order inside one transaction: stock is
//! decremented with conditional updates, the coupon (if any) is consumed with
//! a conditional update, totals are computed from the frozen lines, and the
//! cart is emptied. Any violation rolls the whole transaction back.

use chrono::Utc;
use sqlx::PgPool;

use orchard_core::{Money, OrderId, OrderStatus, UserCouponId, UserId};

use crate::db::{OrderRepository, RepositoryError, carts, coupons, items, orders, users};
use crate::error::{AppError, Result};
use crate::models::cart::CartLine;
use crate::models::order::{DeliveryAddress, Order, OrderView};

/// Service for checkout, cancellation, and status management.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Materialize the user's cart into an order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOperation` for an empty cart, insufficient
    /// stock, or an unusable coupon; nothing is persisted in those cases.
    pub async fn checkout(
        &self,
        user_id: UserId,
        address: DeliveryAddress,
        user_coupon_id: Option<UserCouponId>,
    ) -> Result<OrderView> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let cart_id = carts::lock_by_user(&mut tx, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AppError::NotFound("cart".to_string()),
                other => AppError::Database(other),
            })?;

        let lines = carts::lines_in_tx(&mut tx, cart_id).await?;
        if lines.is_empty() {
            return Err(AppError::InvalidOperation("cart is empty".to_string()));
        }

        // Conditional decrements: a concurrent checkout of the same item
        // loses here instead of oversubscribing stock.
        for line in &lines {
            if !items::decrement_stock(&mut tx, line.item_id, line.quantity).await? {
                return Err(AppError::InvalidOperation(format!(
                    "insufficient stock for item '{}'",
                    line.item_name
                )));
            }
        }

        let total: Money = lines.iter().map(CartLine::subtotal).sum();

        let discount = match user_coupon_id {
            Some(id) => self.consume_coupon(&mut tx, id, user_id, total).await?,
            None => Money::zero(),
        };

        let order = orders::insert_order(&mut tx, user_id).await?;
        for line in &lines {
            orders::insert_order_item(
                &mut tx,
                order.id,
                line.item_id,
                &line.item_name,
                line.unit_price,
                line.quantity,
            )
            .await?;
        }
        orders::insert_order_details(&mut tx, order.id, &address, user_coupon_id, total, discount)
            .await?;

        carts::clear(&mut tx, cart_id).await?;

        // Loyalty: one point per whole currency unit actually payable.
        let final_amount = total.minus(discount);
        users::award_points(&mut tx, user_id, final_amount.whole_units()).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%user_id, order_id = %order.id, %total, %discount, "order placed");

        self.load_view(order.id).await
    }

    async fn consume_coupon(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: UserCouponId,
        user_id: UserId,
        total: Money,
    ) -> Result<Money> {
        let view = coupons::find_user_coupon(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("coupon {id}")))?;

        if view.grant.user_id != user_id {
            return Err(AppError::InvalidOperation(
                "coupon belongs to another user".to_string(),
            ));
        }
        if view.coupon.is_expired(Utc::now()) {
            return Err(AppError::InvalidOperation("coupon has expired".to_string()));
        }
        if !coupons::mark_used(&mut *tx, id).await? {
            return Err(AppError::InvalidOperation(
                "coupon has already been used".to_string(),
            ));
        }

        Ok(view.coupon.discount_against(total))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Order>, u64)> {
        let (orders, total) = OrderRepository::new(self.pool)
            .list_by_user(user_id, limit, offset)
            .await?;
        Ok((orders, total))
    }

    /// One of the user's orders, with lines and details.
    ///
    /// Another user's order is reported as missing, not forbidden.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if absent or owned by someone else.
    pub async fn get(&self, user_id: UserId, order_id: OrderId, is_admin: bool) -> Result<OrderView> {
        let view = self.load_view(order_id).await?;
        if view.order.user_id != user_id && !is_admin {
            return Err(AppError::NotFound(format!("order {order_id}")));
        }
        Ok(view)
    }

    /// Cancel a pending order: restock every line, reinstate the consumed
    /// coupon, and claw back the awarded points.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOperation` once the order has left
    /// `Pending`.
    pub async fn cancel(&self, user_id: UserId, order_id: OrderId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = orders::find_for_update(&mut tx, order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

        if !order.status.cancellable() {
            return Err(AppError::InvalidOperation(format!(
                "order in status '{}' can no longer be cancelled",
                order.status
            )));
        }

        for line in orders::lines_in_tx(&mut tx, order_id).await? {
            items::restore_stock(&mut tx, line.item_id, line.quantity).await?;
        }

        let details = orders::details_in_tx(&mut tx, order_id).await?.ok_or_else(|| {
            AppError::Database(RepositoryError::DataCorruption(format!(
                "order {order_id} has no details row"
            )))
        })?;

        if let Some(coupon_id) = details.user_coupon_id {
            coupons::mark_unused(&mut tx, coupon_id).await?;
        }

        users::award_points(&mut tx, user_id, -details.final_amount().whole_units()).await?;

        if !orders::set_status(&mut tx, order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?
        {
            return Err(AppError::InvalidOperation(
                "order status changed while cancelling".to_string(),
            ));
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%user_id, %order_id, "order cancelled");
        Ok(())
    }

    /// Move an order's status along the fulfillment chain (admin).
    ///
    /// Cancellation is not reachable here; it has its own flow that
    /// restocks and reinstates the coupon.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOperation` for any transition the status
    /// machine does not allow.
    pub async fn set_status(&self, order_id: OrderId, next: OrderStatus) -> Result<Order> {
        if next == OrderStatus::Cancelled {
            return Err(AppError::InvalidOperation(
                "use the cancel operation instead of a status change".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = orders::find_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::InvalidOperation(format!(
                "cannot move order from '{}' to '{next}'",
                order.status
            )));
        }

        if !orders::set_status(&mut tx, order_id, order.status, next).await? {
            return Err(AppError::InvalidOperation(
                "order status changed concurrently".to_string(),
            ));
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        self.load_order(order_id).await
    }

    async fn load_view(&self, order_id: OrderId) -> Result<OrderView> {
        OrderRepository::new(self.pool)
            .find_view(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Order> {
        OrderRepository::new(self.pool)
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
    }
}
