//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{CategoryId, ItemId, Timestamps};

use super::{RepositoryError, conflict_on_unique};
use crate::models::category::Category;

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            timestamps: Timestamps::new(row.created_at, row.updated_at),
        }
    }
}

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, name: &str, description: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category name already exists"))?;

        Ok(row.into())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Rename or re-describe a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist and
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(name)
        .bind(description)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category name already exists"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// How many items are attached to this category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_count(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM category_items WHERE category_id = $1")
                .bind(id.as_i64())
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// Delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach an item to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the item is already attached.
    pub async fn attach_item(
        &self,
        category_id: CategoryId,
        item_id: ItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO category_items (category_id, item_id) VALUES ($1, $2)")
            .bind(category_id.as_i64())
            .bind(item_id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "item already attached to category"))?;

        Ok(())
    }

    /// Detach an item from a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the attachment existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn detach_item(
        &self,
        category_id: CategoryId,
        item_id: ItemId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM category_items WHERE category_id = $1 AND item_id = $2")
                .bind(category_id.as_i64())
                .bind(item_id.as_i64())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// IDs of the items attached to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_ids(&self, id: CategoryId) -> Result<Vec<ItemId>, RepositoryError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT item_id FROM category_items WHERE category_id = $1 ORDER BY item_id",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| ItemId::new(id)).collect())
    }
}
