//! Authentication handlers: sign-up, login, token refresh.

use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use serde::Deserialize;

use crate::error::Result;
use crate::response::StatusResponse;
use crate::services::auth::{AuthService, SignupInput};
use crate::services::token::TokenPair;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

/// Sign-up request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub nickname: String,
}

/// Register a new account.
///
/// # Errors
///
/// `PasswordMismatch` when password and confirmation differ (before any
/// persistence), `DuplicateName` on duplicate email or nickname.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<StatusResponse> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .signup(SignupInput {
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            name: body.name,
            nickname: body.nickname,
        })
        .await?;

    tracing::info!(user_id = %user.id, "user signed up");
    Ok(StatusResponse::created("user registered"))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, pair) = auth.login(&body.email, &body.password).await?;

    tracing::debug!(user_id = %user.id, "user logged in");
    Ok(Json(pair))
}

/// Refresh request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Exchange a refresh token for a fresh pair.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let pair = auth.refresh(&body.refresh_token).await?;

    Ok(Json(pair))
}
