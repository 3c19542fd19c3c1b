//! Unified error handling with Sentry integration.
//!
//! Every failure surfaces as an [`AppError`] and is mapped in one place to a
//! fixed HTTP status plus the uniform error body
//! (`apiPath`, `errorCode`, `errorMessage`, `errorTime`, `validationErrors`).
//! Handlers return `Result<T, AppError>`; the [`error_body`] middleware fills
//! in the request path the error surfaced on.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_name: String,
    pub validation_msg: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            validation_msg: msg.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not allowed in the current state
    /// (insufficient stock, expired coupon, illegal status transition, ...).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A uniqueness constraint would be violated (email, nickname, name).
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// The entity still has dependent records and cannot be removed.
    #[error("Has related entities: {0}")]
    HasRelatedEntities(String),

    /// Password and confirmation differ, or the old password does not verify.
    #[error("Password mismatch")]
    PasswordMismatch,

    /// The bearer token is missing, malformed, expired, or of the wrong kind.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated but not allowed to perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request field validation failed.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource".to_string()),
            RepositoryError::Conflict(msg) => Self::DuplicateName(msg),
            other => Self::Database(other),
        }
    }
}

impl AppError {
    /// The fixed HTTP status for this error kind.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidOperation(_) | Self::PasswordMismatch | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DuplicateName(_) | Self::HasRelatedEntities(_) => StatusCode::CONFLICT,
            Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::HasRelatedEntities(_) => "HAS_RELATED_ENTITIES",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Internal details are not exposed.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn validation_errors(&self) -> Vec<FieldError> {
        match self {
            Self::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidToken("invalid credentials".to_string()),
            AuthError::InvalidToken(msg) => Self::InvalidToken(msg),
            AuthError::PasswordMismatch => Self::PasswordMismatch,
            AuthError::WeakPassword(msg) => {
                Self::Validation(vec![FieldError::new("password", msg)])
            }
            AuthError::InvalidEmail(e) => {
                Self::Validation(vec![FieldError::new("email", e.to_string())])
            }
            AuthError::UserAlreadyExists(field) => Self::DuplicateName(field),
            AuthError::UserNotFound => Self::NotFound("user".to_string()),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
            AuthError::Repository(e) => Self::from(e),
        }
    }
}

/// The uniform error body returned for every failed request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub api_path: String,
    pub error_code: String,
    pub error_message: String,
    pub error_time: DateTime<Utc>,
    pub validation_errors: Vec<FieldError>,
}

/// Error detail stashed in response extensions for [`error_body`] to pick up.
#[derive(Debug, Clone)]
struct ErrorDetails {
    code: &'static str,
    message: String,
    validation_errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry before responding
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let details = ErrorDetails {
            code: self.code(),
            message: self.client_message(),
            validation_errors: self.validation_errors(),
        };

        let mut response = self.status().into_response();
        response.extensions_mut().insert(details);
        response
    }
}

/// Middleware that renders the uniform error body for failed requests.
///
/// [`AppError::into_response`] only knows the error; the request path is
/// attached here, where both sides are in scope.
pub async fn error_body(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    let Some(details) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };

    let body = ErrorBody {
        api_path: path,
        error_code: details.code.to_string(),
        error_message: details.message,
        error_time: Utc::now(),
        validation_errors: details.validation_errors,
    };

    (response.status(), Json(body)).into_response()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("item".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidOperation("out of stock".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateName("email".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::HasRelatedEntities("category".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::PasswordMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidToken("expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("admin only".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("connection pool exhausted".into());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_error_body_field_names_are_camel_case() {
        let body = ErrorBody {
            api_path: "/api/items/1".to_string(),
            error_code: "NOT_FOUND".to_string(),
            error_message: "Not found: item".to_string(),
            error_time: Utc::now(),
            validation_errors: vec![FieldError::new("rating", "must be between 1 and 5")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("apiPath").is_some());
        assert!(json.get("errorCode").is_some());
        assert!(json.get("errorTime").is_some());
        let field = &json["validationErrors"][0];
        assert_eq!(field["fieldName"], "rating");
        assert_eq!(field["validationMsg"], "must be between 1 and 5");
    }
}
