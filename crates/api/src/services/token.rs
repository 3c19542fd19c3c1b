//! Bearer token issuance and validation.
//!
//! Access and refresh tokens are both HS256 JWTs signed with the configured
//! secret; they differ in lifetime and in the `kind` claim, which is checked
//! on decode so a refresh token can never pass as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use orchard_core::{Role, UserId};

use crate::config::ApiConfig;
use crate::services::auth::AuthError;

/// Which of the two tokens a set of claims belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    /// Role at issuance time
    pub role: Role,
    /// Access or refresh
    pub kind: TokenKind,
    /// Issued at (UTC timestamp)
    pub iat: i64,
    /// Expiration time (UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// The user this token was issued to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// An access/refresh token pair, as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates the bearer token pair.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Build a token service from the application configuration.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let secret = config.token_secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::minutes(config.refresh_token_ttl_minutes),
        }
    }

    /// Issue a fresh access/refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails.
    pub fn issue_pair(&self, user_id: UserId, role: Role) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, role, TokenKind::Access, self.access_ttl)?,
            refresh_token: self.issue(user_id, role, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    fn issue(
        &self,
        user_id: UserId,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_i64(),
            role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(format!("failed to encode token: {e}")))
    }

    /// Decode and validate an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for garbled, expired, or
    /// wrong-kind tokens.
    pub fn decode_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode(token, TokenKind::Access)
    }

    /// Decode and validate a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for garbled, expired, or
    /// wrong-kind tokens.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode(token, TokenKind::Refresh)
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.kind != expected {
            return Err(AuthError::InvalidToken(
                "wrong token kind for this operation".to_string(),
            ));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_service(access_minutes: i64) -> TokenService {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            token_secret: SecretString::from("kJ8#mP2$vL9@qR4!xT7&wN3*zB6^cF1%"),
            access_token_ttl_minutes: access_minutes,
            refresh_token_ttl_minutes: access_minutes * 10,
            sentry_dsn: None,
            sentry_environment: None,
        };
        TokenService::new(&config)
    }

    #[test]
    fn test_pair_roundtrip() {
        let service = test_service(30);
        let pair = service.issue_pair(UserId::new(7), Role::Admin).unwrap();

        let access = service.decode_access(&pair.access_token).unwrap();
        assert_eq!(access.user_id(), UserId::new(7));
        assert_eq!(access.role, Role::Admin);

        let refresh = service.decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.user_id(), UserId::new(7));
    }

    #[test]
    fn test_kind_is_enforced() {
        let service = test_service(30);
        let pair = service.issue_pair(UserId::new(1), Role::User).unwrap();

        assert!(service.decode_access(&pair.refresh_token).is_err());
        assert!(service.decode_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_garbled_token_is_rejected() {
        let service = test_service(30);
        assert!(service.decode_access("not-a-jwt").is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service(30);
        let other = test_service(30);
        let pair = service.issue_pair(UserId::new(1), Role::User).unwrap();

        // Same secret decodes fine; a token signed elsewhere must not.
        assert!(other.decode_access(&pair.access_token).is_ok());

        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert!(service.decode_access(&tampered).is_err());
    }
}
