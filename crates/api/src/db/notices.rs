//! Notice repository.
//!
//! Creating a notice broadcasts one `user_notices` row per existing user in
//! the same transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{NoticeId, Timestamps, UserId, UserNoticeId};

use super::RepositoryError;
use crate::models::notice::{Notice, UserNotice};

/// Internal row type for notice queries.
#[derive(Debug, sqlx::FromRow)]
struct NoticeRow {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoticeRow> for Notice {
    fn from(row: NoticeRow) -> Self {
        Self {
            id: NoticeId::new(row.id),
            title: row.title,
            content: row.content,
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        }
    }
}

/// Internal row type for a user's copy of a notice.
#[derive(Debug, sqlx::FromRow)]
struct UserNoticeRow {
    id: i64,
    notice_id: i64,
    user_id: i64,
    title: String,
    content: String,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserNoticeRow> for UserNotice {
    fn from(row: UserNoticeRow) -> Self {
        Self {
            id: UserNoticeId::new(row.id),
            notice_id: NoticeId::new(row.notice_id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            content: row.content,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for notice operations.
pub struct NoticeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoticeRepository<'a> {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a notice and broadcast it to every user.
    ///
    /// # Returns
    ///
    /// The notice and the number of users it reached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is persisted in that case.
    pub async fn create_broadcast(
        &self,
        title: &str,
        content: &str,
    ) -> Result<(Notice, u64), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, NoticeRow>(
            "INSERT INTO notices (title, content)
             VALUES ($1, $2)
             RETURNING id, title, content, created_at, updated_at",
        )
        .bind(title)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "INSERT INTO user_notices (notice_id, user_id)
             SELECT $1, id FROM users",
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row.into(), result.rows_affected()))
    }

    /// All notices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notice>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(
            "SELECT id, title, content, created_at, updated_at
             FROM notices ORDER BY id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notices")
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Delete a notice (per-user copies cascade).
    ///
    /// # Returns
    ///
    /// Returns `true` if the notice was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: NoticeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// A user's notices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserNotice>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, UserNoticeRow>(
            "SELECT un.id, un.notice_id, un.user_id, n.title, n.content,
                    un.is_read, un.read_at, un.created_at
             FROM user_notices un
             JOIN notices n ON n.id = un.notice_id
             WHERE un.user_id = $1
             ORDER BY un.id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_notices WHERE user_id = $1")
                .bind(user_id.as_i64())
                .fetch_one(self.pool)
                .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Mark one of the user's notices as read.
    ///
    /// # Returns
    ///
    /// Returns `true` if the notice belonged to the user and was marked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(
        &self,
        id: UserNoticeId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_notices SET is_read = TRUE, read_at = now()
             WHERE id = $1 AND user_id = $2 AND is_read = FALSE",
        )
        .bind(id.as_i64())
        .bind(user_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
