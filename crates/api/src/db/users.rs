//! User repository.
//!
//! Sign-up creates the user's empty cart and wishlist in the same
//! transaction, so both containers exist for the account's whole life.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use orchard_core::{Email, Role, Tier, Timestamps, UserId};

use super::{RepositoryError, conflict_on_unique, parse_column};
use crate::models::user::{NewUser, UpdateProfileInput, User};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    nickname: String,
    role: String,
    tier: String,
    points: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = parse_column(&self.role, "role")?;
        let tier: Tier = parse_column(&self.tier, "tier")?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            name: self.name,
            nickname: self.nickname,
            role,
            tier,
            points: self.points,
            timestamps: Timestamps::new(self.created_at, self.updated_at),
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, name, nickname, role, tier, points, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has that email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserWithHashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_domain()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get a user's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        let hash: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        hash.map(|(h,)| h).ok_or(RepositoryError::NotFound)
    }

    /// Create a new user together with their empty cart and wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the duplicate field if the
    /// email or nickname already exists; `RepositoryError::Database` for
    /// other database errors. Nothing is persisted on failure.
    pub async fn create(&self, input: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, password_hash, name, nickname)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(input.email.as_str())
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(&input.nickname)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email or nickname already exists"))?;

        let user = row.into_domain()?;

        sqlx::query("INSERT INTO carts (user_id) VALUES ($1)")
            .bind(user.id.as_i64())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO wishlists (user_id) VALUES ($1)")
            .bind(user.id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Update a user's profile fields. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist and
    /// `RepositoryError::Conflict` if the new nickname is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        input: &UpdateProfileInput,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 nickname = COALESCE($3, nickname),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(input.name.as_deref())
        .bind(input.nickname.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "nickname already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i64())
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total.unsigned_abs()))
    }

    /// Set a user's tier and points (administrative override).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_tier(
        &self,
        id: UserId,
        tier: Tier,
        points: i64,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET tier = $2, points = $3, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(tier.to_string())
        .bind(points)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Delete a user. Their cart, wishlist, coupons, and notices cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while orders or inquiry
    /// responses still reference the user.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "user still has orders or inquiry responses".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Award points to a user and promote their tier if a threshold is crossed.
/// Tier only moves upward here.
pub(crate) async fn award_points(
    conn: &mut PgConnection,
    user_id: UserId,
    points: i64,
) -> Result<(), RepositoryError> {
    let (total_points, current_tier): (i64, String) = sqlx::query_as(
        "UPDATE users SET points = points + $2, updated_at = now()
         WHERE id = $1
         RETURNING points, tier",
    )
    .bind(user_id.as_i64())
    .bind(points)
    .fetch_one(&mut *conn)
    .await?;

    let current: Tier = parse_column(&current_tier, "tier")?;
    let earned = Tier::for_points(total_points);
    if earned > current {
        sqlx::query("UPDATE users SET tier = $2, updated_at = now() WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(earned.to_string())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
