//! # Category Repository
//!
//! Database operations for product categories. Categories are soft-deleted
//! and the delete is refused while active products still reference them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::Visibility;
use shopfront_core::{Category, CoreError};

const COLUMNS: &str = "id, name, description, is_active, created_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories sorted by name.
    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE {} ORDER BY name",
            visibility.predicate()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - name already taken
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        debug!(name = %name, "Inserting category");

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Updates name and/or description; absent fields keep their value.
    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DbResult<Category> {
        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name.map(str::trim))
        .bind(description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category.
    ///
    /// Refused with [`CoreError::CategoryInUse`] while active products still
    /// reference it; the check and the flag update run in one transaction so
    /// a concurrent product insert can't slip between them.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))?;

        let active_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active_products > 0 {
            return Err(CoreError::CategoryInUse {
                name: category.name,
                active_products,
            }
            .into());
        }

        sqlx::query("UPDATE categories SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_list_and_visibility() {
        let db = test_db().await;
        let repo = db.categories();

        repo.insert("Beverages", Some("Cold drinks")).await.unwrap();
        let snacks = repo.insert("Snacks", None).await.unwrap();
        repo.soft_delete(&snacks.id).await.unwrap();

        let active = repo.list(Visibility::ActiveOnly).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Beverages");

        let all = repo.list(Visibility::IncludeInactive).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.categories();

        repo.insert("Beverages", None).await.unwrap();
        let err = repo.insert("Beverages", None).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let db = test_db().await;
        let repo = db.categories();

        let category = repo.insert("Beverages", Some("Cold drinks")).await.unwrap();
        let updated = repo.update(&category.id, Some("Drinks"), None).await.unwrap();

        assert_eq!(updated.name, "Drinks");
        assert_eq!(updated.description.as_deref(), Some("Cold drinks"));
    }

    #[tokio::test]
    async fn test_soft_delete_refused_with_active_products() {
        let db = test_db().await;
        let categories = db.categories();
        let products = db.products();

        let category = categories.insert("Beverages", None).await.unwrap();
        let product = products
            .insert(NewProduct {
                name: "Coke 330ml".into(),
                sku: "COKE-330".into(),
                barcode: None,
                description: None,
                cost_price_cents: 80,
                selling_price_cents: 120,
                stock_quantity: 10,
                reorder_level: 5,
                category_id: Some(category.id.clone()),
                supplier_id: None,
            })
            .await
            .unwrap();

        let err = categories.soft_delete(&category.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CategoryInUse { .. })
        ));

        // Deactivating the product unblocks the category delete.
        products.soft_delete(&product.id).await.unwrap();
        categories.soft_delete(&category.id).await.unwrap();
    }
}
