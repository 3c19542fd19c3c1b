//! Authentication service.
//!
//! Sign-up, login, token refresh, and password changes. Passwords are hashed
//! with Argon2id; sessions are a stateless access/refresh JWT pair issued by
//! [`TokenService`](crate::services::token::TokenService).

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use orchard_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};
use crate::services::token::{TokenPair, TokenService};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-up input, validated in full before anything is persisted.
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub nickname: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user.
    ///
    /// All validation happens before the insert, so a failed sign-up is a
    /// no-op: mismatched passwords never reach the database, and duplicate
    /// email/nickname is refused by constraint without a partial row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if password and confirmation
    /// differ, `AuthError::InvalidEmail`/`WeakPassword` on format failures,
    /// and `AuthError::UserAlreadyExists` on duplicate identification.
    pub async fn signup(&self, input: SignupInput) -> Result<User, AuthError> {
        if input.password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash,
                name: input.name,
                nickname: input.nickname,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(field) => AuthError::UserAlreadyExists(field),
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, issuing a token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_by_email_with_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let pair = self.tokens.issue_pair(user.id, user.role)?;
        Ok((user, pair))
    }

    /// Exchange a valid refresh token for a fresh pair.
    ///
    /// The user's current role is re-read so a promotion or demotion takes
    /// effect at the next refresh.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for anything but a live refresh
    /// token belonging to an existing user.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.decode_refresh(refresh_token)?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AuthError::InvalidToken("user no longer exists".to_string()))?;

        self.tokens.issue_pair(user.id, user.role)
    }

    /// Change a user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the old password does not
    /// verify or the new password and confirmation differ.
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(new_password)?;

        let current_hash = self.users.password_hash(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        verify_password(old_password, &current_hash)
            .map_err(|_| AuthError::PasswordMismatch)?;

        let new_hash = hash_password(new_password)?;
        self.users.update_password_hash(user_id, &new_hash).await?;

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
    }
}
