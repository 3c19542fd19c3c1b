//! User profile and admin user-management handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use serde::Deserialize;

use orchard_core::{Permission, Tier, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::user::{UpdateProfileInput, User};
use crate::response::{PageQuery, PageResponse, StatusResponse};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(me).patch(update_me))
        .route("/api/users/me/password", patch(change_password))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/tier", patch(set_tier))
        .route("/api/admin/users/{id}", delete(delete_user))
}

/// Current user's profile.
pub async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let profile = UserRepository::new(state.pool())
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(Json(profile))
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub nickname: Option<String>,
}

/// Update the current user's name or nickname.
pub async fn update_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<StatusResponse> {
    UserRepository::new(state.pool())
        .update_profile(
            user.id,
            &UpdateProfileInput {
                name: body.name,
                nickname: body.nickname,
            },
        )
        .await?;

    Ok(StatusResponse::ok("profile updated"))
}

/// Password change request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Change the current user's password.
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusResponse> {
    AuthService::new(state.pool(), state.tokens())
        .change_password(
            user.id,
            &body.old_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;

    Ok(StatusResponse::ok("password changed"))
}

/// List users (admin).
pub async fn list_users(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<User>>> {
    user.require(Permission::ListUsers)?;

    let (users, total) = UserRepository::new(state.pool())
        .list(page.limit(), page.offset())
        .await?;

    Ok(Json(PageResponse::new(users, &page, total)))
}

/// Tier override request body.
#[derive(Debug, Deserialize)]
pub struct SetTierRequest {
    pub tier: Tier,
    pub points: i64,
}

/// Set a user's tier and points (admin).
pub async fn set_tier(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<SetTierRequest>,
) -> Result<StatusResponse> {
    admin.require(Permission::ManageUsers)?;

    UserRepository::new(state.pool())
        .set_tier(id, body.tier, body.points)
        .await?;

    Ok(StatusResponse::ok("tier updated"))
}

/// Delete a user (super admin only).
pub async fn delete_user(
    RequireAuth(admin): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusResponse> {
    admin.require(Permission::DeleteUsers)?;

    if admin.id == id {
        return Err(AppError::InvalidOperation(
            "cannot delete your own account".to_string(),
        ));
    }

    let deleted = UserRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::HasRelatedEntities(msg),
            other => AppError::from(other),
        })?;
    if !deleted {
        return Err(AppError::NotFound(format!("user {id}")));
    }

    tracing::info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(StatusResponse::ok("user deleted"))
}
