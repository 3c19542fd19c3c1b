//! Coupon repository: definitions and per-user grants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{CouponId, DiscountType, Timestamps, UserCouponId, UserId};

use super::{RepositoryError, conflict_on_unique, parse_column};
use crate::models::coupon::{Coupon, UserCoupon, UserCouponView};

/// Internal row type for coupon queries.
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i64,
    name: String,
    discount_type: String,
    discount_value: Decimal,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CouponRow {
    fn into_domain(self) -> Result<Coupon, RepositoryError> {
        let discount_type: DiscountType = parse_column(&self.discount_type, "discount_type")?;
        Ok(Coupon {
            id: CouponId::new(self.id),
            name: self.name,
            discount_type,
            discount_value: self.discount_value,
            expires_at: self.expires_at,
            timestamps: Timestamps::new(self.created_at, self.updated_at),
        })
    }
}

/// Internal row type for a user coupon joined with its definition.
#[derive(Debug, sqlx::FromRow)]
struct UserCouponRow {
    id: i64,
    user_id: i64,
    is_used: bool,
    used_at: Option<DateTime<Utc>>,
    coupon_id: i64,
    coupon_name: String,
    discount_type: String,
    discount_value: Decimal,
    expires_at: DateTime<Utc>,
    coupon_created_at: DateTime<Utc>,
    coupon_updated_at: DateTime<Utc>,
}

impl UserCouponRow {
    fn into_domain(self) -> Result<UserCouponView, RepositoryError> {
        let discount_type: DiscountType = parse_column(&self.discount_type, "discount_type")?;
        let coupon = Coupon {
            id: CouponId::new(self.coupon_id),
            name: self.coupon_name,
            discount_type,
            discount_value: self.discount_value,
            expires_at: self.expires_at,
            timestamps: Timestamps::new(self.coupon_created_at, self.coupon_updated_at),
        };
        Ok(UserCouponView {
            grant: UserCoupon {
                id: UserCouponId::new(self.id),
                user_id: UserId::new(self.user_id),
                coupon_id: coupon.id,
                is_used: self.is_used,
                used_at: self.used_at,
            },
            coupon,
        })
    }
}

const COUPON_COLUMNS: &str =
    "id, name, discount_type, discount_value, expires_at, created_at, updated_at";

const USER_COUPON_JOIN: &str =
    "SELECT uc.id, uc.user_id, uc.is_used, uc.used_at,
            c.id AS coupon_id, c.name AS coupon_name, c.discount_type, c.discount_value,
            c.expires_at, c.created_at AS coupon_created_at, c.updated_at AS coupon_updated_at
     FROM user_coupons uc
     JOIN coupons c ON c.id = uc.coupon_id";

/// Repository for coupon operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a coupon definition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        discount_type: DiscountType,
        discount_value: Decimal,
        expires_at: DateTime<Utc>,
    ) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "INSERT INTO coupons (name, discount_type, discount_value, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(name)
        .bind(discount_type.to_string())
        .bind(discount_value)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "coupon name already exists"))?;

        row.into_domain()
    }

    /// Get a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(CouponRow::into_domain).transpose()
    }

    /// List coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Coupon>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coupons")
            .fetch_one(self.pool)
            .await?;

        let coupons = rows
            .into_iter()
            .map(CouponRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((coupons, total.unsigned_abs()))
    }

    /// Whether the coupon has been distributed to anyone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_distributed(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM user_coupons WHERE coupon_id = $1)")
                .bind(id.as_i64())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Delete a coupon definition.
    ///
    /// # Returns
    ///
    /// Returns `true` if the coupon was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Grant a coupon to one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already holds it.
    pub async fn distribute(
        &self,
        coupon_id: CouponId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO user_coupons (user_id, coupon_id) VALUES ($1, $2)")
            .bind(user_id.as_i64())
            .bind(coupon_id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "user already holds this coupon"))?;

        Ok(())
    }

    /// Grant a coupon to every user, skipping those who already hold it.
    ///
    /// # Returns
    ///
    /// The number of users the coupon was newly granted to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distribute_to_all(&self, coupon_id: CouponId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO user_coupons (user_id, coupon_id)
             SELECT id, $1 FROM users
             ON CONFLICT (user_id, coupon_id) DO NOTHING",
        )
        .bind(coupon_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// A user's coupons, newest grant first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_coupons(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserCouponView>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserCouponRow>(&format!(
            "{USER_COUPON_JOIN} WHERE uc.user_id = $1 ORDER BY uc.id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserCouponRow::into_domain).collect()
    }
}

/// Load one user-coupon grant with its definition, inside a transaction.
pub(crate) async fn find_user_coupon(
    conn: &mut PgConnection,
    id: UserCouponId,
) -> Result<Option<UserCouponView>, RepositoryError> {
    let row = sqlx::query_as::<_, UserCouponRow>(&format!("{USER_COUPON_JOIN} WHERE uc.id = $1"))
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;

    row.map(UserCouponRow::into_domain).transpose()
}

/// Consume a grant. The conditional update makes double-spends impossible:
/// `false` means it was already used (or never existed).
pub(crate) async fn mark_used(
    conn: &mut PgConnection,
    id: UserCouponId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE user_coupons SET is_used = TRUE, used_at = now(), updated_at = now()
         WHERE id = $1 AND is_used = FALSE",
    )
    .bind(id.as_i64())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Reinstate a grant consumed by a since-cancelled order.
pub(crate) async fn mark_unused(
    conn: &mut PgConnection,
    id: UserCouponId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE user_coupons SET is_used = FALSE, used_at = NULL, updated_at = now()
         WHERE id = $1",
    )
    .bind(id.as_i64())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
