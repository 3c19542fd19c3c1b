//! Authentication error types.

use thiserror::Error;

use orchard_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token is missing, garbled, expired, or of the wrong kind.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Password and confirmation differ, or the old password does not verify.
    #[error("password mismatch")]
    PasswordMismatch,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A user with this email or nickname already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// User doesn't exist.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
