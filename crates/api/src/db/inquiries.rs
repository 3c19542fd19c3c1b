//! Inquiry repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{InquiryId, ItemId, Timestamps, UserId};

use super::RepositoryError;
use crate::models::inquiry::{Inquiry, InquiryResponse, InquiryView};

/// Internal row type for inquiry queries, with the optional response joined.
#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: i64,
    user_id: i64,
    item_id: i64,
    title: String,
    content: String,
    is_resolved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    responder_id: Option<i64>,
    response_content: Option<String>,
    response_created_at: Option<DateTime<Utc>>,
}

impl From<InquiryRow> for InquiryView {
    fn from(row: InquiryRow) -> Self {
        let response = match (row.responder_id, row.response_content, row.response_created_at) {
            (Some(responder_id), Some(content), Some(created_at)) => Some(InquiryResponse {
                responder_id: UserId::new(responder_id),
                content,
                created_at,
            }),
            _ => None,
        };

        Self {
            inquiry: Inquiry {
                id: InquiryId::new(row.id),
                user_id: UserId::new(row.user_id),
                item_id: ItemId::new(row.item_id),
                title: row.title,
                content: row.content,
                is_resolved: row.is_resolved,
                timestamps: Timestamps::new(row.created_at, row.updated_at),
            },
            response,
        }
    }
}

const INQUIRY_JOIN: &str =
    "SELECT q.id, q.user_id, q.item_id, q.title, q.content, q.is_resolved,
            q.created_at, q.updated_at,
            r.responder_id, r.content AS response_content, r.created_at AS response_created_at
     FROM inquiries q
     LEFT JOIN inquiry_responses r ON r.inquiry_id = q.id";

/// Repository for inquiry operations.
pub struct InquiryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InquiryRepository<'a> {
    /// Create a new inquiry repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File an inquiry about an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        item_id: ItemId,
        title: &str,
        content: &str,
    ) -> Result<Inquiry, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i64,
            user_id: i64,
            item_id: i64,
            title: String,
            content: String,
            is_resolved: bool,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, Row>(
            "INSERT INTO inquiries (user_id, item_id, title, content)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, item_id, title, content, is_resolved, created_at, updated_at",
        )
        .bind(user_id.as_i64())
        .bind(item_id.as_i64())
        .bind(title)
        .bind(content)
        .fetch_one(self.pool)
        .await?;

        Ok(Inquiry {
            id: InquiryId::new(row.id),
            user_id: UserId::new(row.user_id),
            item_id: ItemId::new(row.item_id),
            title: row.title,
            content: row.content,
            is_resolved: row.is_resolved,
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        })
    }

    /// Get an inquiry with its response, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_view(&self, id: InquiryId) -> Result<Option<InquiryView>, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(&format!("{INQUIRY_JOIN} WHERE q.id = $1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// A user's inquiries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InquiryView>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, InquiryRow>(&format!(
            "{INQUIRY_JOIN} WHERE q.user_id = $1 ORDER BY q.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.as_i64())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// All inquiries, optionally filtered by resolution state, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        resolved: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InquiryView>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, InquiryRow>(&format!(
            "{INQUIRY_JOIN}
             WHERE $1::boolean IS NULL OR q.is_resolved = $1
             ORDER BY q.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(resolved)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inquiries WHERE $1::boolean IS NULL OR is_resolved = $1",
        )
        .bind(resolved)
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total.unsigned_abs()))
    }

    /// Record the admin response to an inquiry and mark it resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the inquiry doesn't exist and
    /// `RepositoryError::Conflict` if it already has a response.
    pub async fn respond(
        &self,
        id: InquiryId,
        responder_id: UserId,
        content: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(bool,)> =
            sqlx::query_as("SELECT is_resolved FROM inquiries WHERE id = $1 FOR UPDATE")
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let result = sqlx::query(
            "INSERT INTO inquiry_responses (inquiry_id, responder_id, content)
             VALUES ($1, $2, $3)
             ON CONFLICT (inquiry_id) DO NOTHING",
        )
        .bind(id.as_i64())
        .bind(responder_id.as_i64())
        .bind(content)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "inquiry already has a response".to_owned(),
            ));
        }

        sqlx::query("UPDATE inquiries SET is_resolved = TRUE, updated_at = now() WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
