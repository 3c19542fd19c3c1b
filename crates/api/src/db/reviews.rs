//! Review repository.
//!
//! Every review mutation folds its rating change into the item's aggregates
//! in the same transaction; the aggregates never drift from the rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{ItemId, ReviewId, Timestamps, UserId};

use super::{RepositoryError, conflict_on_unique, items};
use crate::models::review::Review;

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    item_id: i64,
    rating: i32,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            user_id: UserId::new(row.user_id),
            item_id: ItemId::new(row.item_id),
            rating: row.rating,
            content: row.content,
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        }
    }
}

const REVIEW_COLUMNS: &str = "id, user_id, item_id, rating, content, created_at, updated_at";

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review and fold the rating into the item's aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// item; `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        item_id: ItemId,
        rating: i32,
        content: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (user_id, item_id, rating, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(item_id.as_i64())
        .bind(rating)
        .bind(content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "user already reviewed this item"))?;

        items::apply_rating_delta(&mut *tx, item_id, i64::from(rating), 1).await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// An item's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_item(
        &self,
        item_id: ItemId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Review>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE item_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(item_id.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE item_id = $1")
            .bind(item_id.as_i64())
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Change a review's rating or content, adjusting the item's aggregates
    /// by the rating difference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Option<i32>,
        content: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews
             SET rating = COALESCE($2, rating),
                 content = COALESCE($3, content),
                 updated_at = now()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(rating)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        let delta = i64::from(row.rating) - i64::from(old.rating);
        if delta != 0 {
            items::apply_rating_delta(&mut *tx, ItemId::new(row.item_id), delta, 0).await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete a review, removing its rating from the item's aggregates.
    ///
    /// # Returns
    ///
    /// Returns `true` if the review was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "DELETE FROM reviews WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        items::apply_rating_delta(
            &mut *tx,
            ItemId::new(row.item_id),
            -i64::from(row.rating),
            -1,
        )
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}
