//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! `stock_quantity` is deliberately absent from the update path: stock is
//! only ever mutated through checkout or a recorded stock movement, so the
//! audit ledger always explains the current level.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::Visibility;
use shopfront_core::Product;

pub(crate) const COLUMNS: &str = "id, name, sku, barcode, description, cost_price_cents, \
     selling_price_cents, stock_quantity, reorder_level, category_id, supplier_id, \
     is_active, created_at, updated_at";

/// A new product to add to the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    pub stock_quantity: i64,
    pub reorder_level: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub cost_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
    pub reorder_level: Option<i64>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products sorted by name.
    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE {} ORDER BY name",
            visibility.predicate()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID, regardless of active state.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name, SKU, or barcode substring.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(Visibility::ActiveOnly).await;
        }

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {COLUMNS} FROM products
            WHERE is_active = 1
              AND (name LIKE ?1 OR sku LIKE ?1 OR barcode LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists products belonging to a category.
    pub async fn list_by_category(
        &self,
        category_id: &str,
        visibility: Visibility,
    ) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE category_id = ?1 AND {} ORDER BY name",
            visibility.predicate()
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - SKU or barcode already exists
    pub async fn insert(&self, new_product: NewProduct) -> DbResult<Product> {
        debug!(sku = %new_product.sku, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new_product.name.trim().to_string(),
            sku: new_product.sku.trim().to_string(),
            barcode: new_product.barcode,
            description: new_product.description,
            cost_price_cents: new_product.cost_price_cents,
            selling_price_cents: new_product.selling_price_cents,
            stock_quantity: new_product.stock_quantity,
            reorder_level: new_product.reorder_level,
            category_id: new_product.category_id,
            supplier_id: new_product.supplier_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, barcode, description,
                cost_price_cents, selling_price_cents,
                stock_quantity, reorder_level,
                category_id, supplier_id,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7,
                ?8, ?9,
                ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update. Stock is not updatable here.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                sku = COALESCE(?3, sku),
                barcode = COALESCE(?4, barcode),
                description = COALESCE(?5, description),
                cost_price_cents = COALESCE(?6, cost_price_cents),
                selling_price_cents = COALESCE(?7, selling_price_cents),
                reorder_level = COALESCE(?8, reorder_level),
                category_id = COALESCE(?9, category_id),
                supplier_id = COALESCE(?10, supplier_id),
                is_active = COALESCE(?11, is_active),
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.sku.as_deref().map(str::trim))
        .bind(&patch.barcode)
        .bind(&patch.description)
        .bind(patch.cost_price_cents)
        .bind(patch.selling_price_cents)
        .bind(patch.reorder_level)
        .bind(&patch.category_id)
        .bind(&patch.supplier_id)
        .bind(patch.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false. Historical
    /// sales and movements keep referencing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products.
    pub async fn count(&self, visibility: Visibility) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products WHERE {}",
            visibility.predicate()
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, sku: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            barcode: None,
            description: None,
            cost_price_cents: 8000,
            selling_price_cents: 12000,
            stock_quantity: stock,
            reorder_level: 5,
            category_id: None,
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(new_product("Coca-Cola 330ml", "COKE-330", 10))
            .await
            .unwrap();
        repo.insert(new_product("Pepsi 330ml", "PEPSI-330", 10))
            .await
            .unwrap();

        let hits = repo.search("coke", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sku, "COKE-330");

        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(new_product("Coke", "COKE-330", 10)).await.unwrap();
        let err = repo
            .insert(new_product("Coke again", "COKE-330", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_patch() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert(new_product("Coke", "COKE-330", 10)).await.unwrap();

        let updated = repo
            .update(
                &product.id,
                ProductPatch {
                    selling_price_cents: Some(13000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.selling_price_cents, 13000);
        // Untouched fields keep their values.
        assert_eq!(updated.name, "Coke");
        assert_eq!(updated.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_listing() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert(new_product("Coke", "COKE-330", 10)).await.unwrap();
        repo.soft_delete(&product.id).await.unwrap();

        assert_eq!(repo.list(Visibility::ActiveOnly).await.unwrap().len(), 0);
        assert_eq!(repo.count(Visibility::IncludeInactive).await.unwrap(), 1);

        // Still reachable by ID for historical lookups.
        assert!(repo.find_by_id(&product.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;
        let err = db
            .products()
            .update("missing", ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
