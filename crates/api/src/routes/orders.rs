//! Order handlers: checkout, history, cancellation, fulfillment status.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

use orchard_core::{OrderId, OrderStatus, Permission, Role, UserCouponId};

use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::order::{DeliveryAddress, Order, OrderView};
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(checkout))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route("/api/admin/orders/{id}/status", patch(set_status))
}

/// Checkout request body: delivery address plus an optional coupon.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub recipient: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub postal_code: String,
    pub phone: String,
    pub user_coupon_id: Option<UserCouponId>,
}

/// Checkout response envelope carrying the created order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub status_code: u16,
    pub status_message: String,
    pub order: OrderView,
}

/// Materialize the caller's cart into an order.
pub async fn checkout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    validate_address(&body)?;

    let order = OrderService::new(state.pool())
        .checkout(
            user.id,
            DeliveryAddress {
                recipient: body.recipient,
                address_line1: body.address_line1,
                address_line2: body.address_line2,
                postal_code: body.postal_code,
                phone: body.phone,
            },
            body.user_coupon_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            status_code: StatusCode::CREATED.as_u16(),
            status_message: "order placed".to_string(),
            order,
        }),
    ))
}

/// The caller's orders, paginated.
pub async fn list_orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Order>>> {
    let (orders, total) = OrderService::new(state.pool())
        .list(user.id, page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(orders, &page, total)))
}

/// One order with lines and details. Admins can read any order.
pub async fn get_order(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let is_admin = user.role != Role::User;
    let view = OrderService::new(state.pool())
        .get(user.id, id, is_admin)
        .await?;

    Ok(Json(view))
}

/// Cancel one of the caller's pending orders.
pub async fn cancel_order(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusResponse> {
    OrderService::new(state.pool()).cancel(user.id, id).await?;
    Ok(StatusResponse::ok("order cancelled"))
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Advance an order along the fulfillment chain (admin).
pub async fn set_status(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageOrders)?;

    let order = OrderService::new(state.pool())
        .set_status(id, body.status)
        .await?;

    Ok(StatusResponse::ok(format!(
        "order moved to '{}'",
        order.status
    )))
}

fn validate_address(body: &CheckoutRequest) -> Result<()> {
    let required = [
        ("recipient", &body.recipient),
        ("addressLine1", &body.address_line1),
        ("postalCode", &body.postal_code),
        ("phone", &body.phone),
    ];

    let errors: Vec<FieldError> = required
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldError::new(field, "must not be empty"))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            recipient: "A. Customer".to_string(),
            address_line1: "1 Main St".to_string(),
            address_line2: String::new(),
            postal_code: "00000".to_string(),
            phone: "555-0100".to_string(),
            user_coupon_id: None,
        }
    }

    #[test]
    fn test_validate_address_accepts_complete() {
        assert!(validate_address(&request()).is_ok());
    }

    #[test]
    fn test_validate_address_collects_all_failures() {
        let mut body = request();
        body.recipient = String::new();
        body.phone = "  ".to_string();

        let err = validate_address(&body).expect_err("should fail");
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field_name, "recipient");
                assert_eq!(fields[1].field_name, "phone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
