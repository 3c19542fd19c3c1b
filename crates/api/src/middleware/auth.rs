//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] to get the calling user, then consult the
//! authorization policy with [`CurrentUser::require`] for role-gated
//! actions.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn create_item(
//!     RequireAuth(user): RequireAuth,
//!     State(state): State<AppState>,
//! ) -> Result<StatusResponse> {
//!     user.require(Permission::ManageCatalog)?;
//!     // ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use orchard_core::{Permission, Role, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, as carried by their access token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Check the authorization policy for an action.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the caller's role is not granted
    /// the permission.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.grants(permission) {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "your role does not allow this action".to_string(),
        ))
    }
}

/// Extractor that requires a valid bearer access token.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens().decode_access(token)?;

        Ok(Self(CurrentUser {
            id: claims.user_id(),
            role: claims.role,
        }))
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::InvalidToken("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::InvalidToken("malformed Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::InvalidToken("expected a bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_follows_policy() {
        let admin = CurrentUser {
            id: UserId::new(1),
            role: Role::Admin,
        };
        let customer = CurrentUser {
            id: UserId::new(2),
            role: Role::User,
        };

        assert!(admin.require(Permission::ManageCatalog).is_ok());
        assert!(customer.require(Permission::ManageCatalog).is_err());
        assert!(admin.require(Permission::DeleteUsers).is_err());
    }
}
