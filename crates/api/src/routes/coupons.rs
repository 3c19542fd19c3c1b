//! Coupon handlers: admin definitions/distribution and the user's own list.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{CouponId, DiscountType, Permission, UserId};

use crate::db::{CouponRepository, RepositoryError, UserRepository};
use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::coupon::{Coupon, UserCouponView};
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::state::AppState;

/// Build the coupons router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me/coupons", get(my_coupons))
        .route("/api/admin/coupons", get(list_coupons).post(create_coupon))
        .route("/api/admin/coupons/{id}", axum::routing::delete(delete_coupon))
        .route(
            "/api/admin/coupons/{id}/distribute/{user_id}",
            post(distribute),
        )
        .route("/api/admin/coupons/{id}/distribute-all", post(distribute_all))
}

/// One of the caller's coupons with its current usability.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCouponResponse {
    #[serde(flatten)]
    pub view: UserCouponView,
    pub usable: bool,
}

/// The current user's coupons.
pub async fn my_coupons(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserCouponResponse>>> {
    let now = Utc::now();
    let coupons = CouponRepository::new(state.pool())
        .user_coupons(user.id)
        .await?
        .into_iter()
        .map(|view| UserCouponResponse {
            usable: view.usable(now),
            view,
        })
        .collect();

    Ok(Json(coupons))
}

/// Coupon creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub expires_at: DateTime<Utc>,
}

/// Create a coupon definition (admin).
pub async fn create_coupon(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateCouponRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCoupons)?;
    validate_discount(body.discount_type, body.discount_value)?;

    CouponRepository::new(state.pool())
        .create(&body.name, body.discount_type, body.discount_value, body.expires_at)
        .await?;

    Ok(StatusResponse::created("coupon created"))
}

/// List coupon definitions (admin).
pub async fn list_coupons(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Coupon>>> {
    admin.require(Permission::ManageCoupons)?;

    let (coupons, total) = CouponRepository::new(state.pool())
        .list(page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(coupons, &page, total)))
}

/// Delete a coupon definition (admin). Refused once distributed.
pub async fn delete_coupon(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCoupons)?;

    let repo = CouponRepository::new(state.pool());
    if repo.is_distributed(id).await? {
        return Err(AppError::HasRelatedEntities(format!(
            "coupon {id} has been distributed to users"
        )));
    }

    if !repo.delete(id).await? {
        return Err(AppError::NotFound(format!("coupon {id}")));
    }

    Ok(StatusResponse::ok("coupon deleted"))
}

/// Grant a coupon to one user (admin).
pub async fn distribute(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(CouponId, UserId)>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCoupons)?;

    let repo = CouponRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("coupon {id}")))?;
    UserRepository::new(state.pool())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    repo.distribute(id, user_id).await.map_err(|e| match e {
        RepositoryError::Conflict(msg) => AppError::InvalidOperation(msg),
        other => AppError::from(other),
    })?;

    tracing::info!(coupon_id = %id, %user_id, "coupon distributed");
    Ok(StatusResponse::created("coupon distributed"))
}

/// Grant a coupon to all users (admin), skipping existing holders.
pub async fn distribute_all(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageCoupons)?;

    let repo = CouponRepository::new(state.pool());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("coupon {id}")))?;

    let granted = repo.distribute_to_all(id).await?;

    tracing::info!(coupon_id = %id, granted, "coupon broadcast");
    Ok(StatusResponse::created(format!(
        "coupon distributed to {granted} users"
    )))
}

fn validate_discount(discount_type: DiscountType, value: Decimal) -> Result<()> {
    let mut errors = Vec::new();

    if value.is_sign_negative() {
        errors.push(FieldError::new("discountValue", "must not be negative"));
    }
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        errors.push(FieldError::new(
            "discountValue",
            "percentage must be at most 100",
        ));
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
    fn test_validate_discount() {
        assert!(validate_discount(DiscountType::FixedAmount, Decimal::from(50)).is_ok());
        assert!(validate_discount(DiscountType::Percentage, Decimal::from(100)).is_ok());
        assert!(validate_discount(DiscountType::Percentage, Decimal::from(101)).is_err());
        assert!(validate_discount(DiscountType::FixedAmount, Decimal::from(-1)).is_err());
        // Fixed amounts above any particular total are fine; they clamp at
        // application time.
        assert!(validate_discount(DiscountType::FixedAmount, Decimal::from(1_000_000)).is_ok());
    }
}
