//! # Stock Repository
//!
//! Manual stock adjustments, derived inventory status, and the movement
//! history ledger.
//!
//! ## Movement Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_movement(product, IN|OUT, qty)                                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. load the product                                                  │
//! │    2. IN:  stock_quantity += qty                                        │
//! │       OUT: guarded decrement, 0 rows → InsufficientStock                │
//! │    3. INSERT stock_movement (audit row)                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The stock update and its audit record succeed or fail together.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use futures::stream::{Stream, TryStreamExt};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::COLUMNS as PRODUCT_COLUMNS;
use shopfront_core::validation::validate_quantity;
use shopfront_core::{
    CoreError, Money, MovementKind, Product, StockMovement, StockStatus, ValidationError,
};

// =============================================================================
// Input / Output Types
// =============================================================================

/// A manual stock adjustment to record.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: String,
    /// `In` or `Out`; `Sale` entries are written by checkout only.
    pub movement: MovementKind,
    pub quantity: i64,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub user_id: String,
}

/// The recorded movement plus the product it left behind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    pub movement: StockMovement,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: i64,
    pub out_of_stock: i64,
    pub low_stock: i64,
    pub total_value_cents: Money,
}

/// One active product with its derived stock status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(flatten)]
    pub product: Product,
    pub status: StockStatus,
}

/// Derived stock overview for every active product, lowest stock first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub stats: InventoryStats,
    pub products: Vec<InventoryItem>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock movement operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Records a manual IN/OUT movement atomically with the product update.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - non-positive quantity, or kind `Sale`
    /// * `DbError::NotFound` - unknown product
    /// * `CoreError::InsufficientStock` - OUT larger than current stock;
    ///   the stock level is left unchanged, never clamped
    pub async fn record_movement(&self, new_movement: NewMovement) -> DbResult<MovementOutcome> {
        validate_quantity(new_movement.quantity).map_err(CoreError::from)?;

        if new_movement.movement == MovementKind::Sale {
            return Err(CoreError::from(ValidationError::InvalidFormat {
                field: "type".to_string(),
                reason: "must be IN or OUT".to_string(),
            })
            .into());
        }

        debug!(
            product_id = %new_movement.product_id,
            movement = ?new_movement.movement,
            quantity = new_movement.quantity,
            "Recording stock movement"
        );

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(&new_movement.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", &new_movement.product_id))?;

        let now = Utc::now();

        match new_movement.movement {
            MovementKind::In => {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock_quantity = stock_quantity + ?1, updated_at = ?2
                    WHERE id = ?3
                    "#,
                )
                .bind(new_movement.quantity)
                .bind(now)
                .bind(&product.id)
                .execute(&mut *tx)
                .await?;
            }
            MovementKind::Out => {
                let updated = sqlx::query(
                    r#"
                    UPDATE products
                    SET stock_quantity = stock_quantity - ?1, updated_at = ?2
                    WHERE id = ?3 AND stock_quantity >= ?1
                    "#,
                )
                .bind(new_movement.quantity)
                .bind(now)
                .bind(&product.id)
                .execute(&mut *tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(CoreError::InsufficientStock {
                        name: product.name,
                        available: product.stock_quantity,
                        requested: new_movement.quantity,
                    }
                    .into());
                }
            }
            MovementKind::Sale => unreachable!("rejected above"),
        }

        let default_reason = match new_movement.movement {
            MovementKind::In => "Manual Stock IN",
            _ => "Manual Stock OUT",
        };
        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            user_id: new_movement.user_id,
            movement: new_movement.movement,
            quantity: new_movement.quantity,
            reason: Some(
                new_movement
                    .reason
                    .unwrap_or_else(|| default_reason.to_string()),
            ),
            reference: new_movement.reference,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, user_id, movement, quantity, reason, reference, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(&movement.user_id)
        .bind(movement.movement)
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(&movement.reference)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(&movement.product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MovementOutcome { movement, product })
    }

    /// Classifies every active product and aggregates counts and total
    /// stock value (Σ stock × selling price). Lowest stock first, so the
    /// items needing attention lead the list.
    pub async fn summary(&self) -> DbResult<InventorySummary> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1
            ORDER BY stock_quantity ASC, name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut stats = InventoryStats {
            total_products: products.len() as i64,
            out_of_stock: 0,
            low_stock: 0,
            total_value_cents: Money::zero(),
        };

        let items: Vec<InventoryItem> = products
            .into_iter()
            .map(|product| {
                let status = product.stock_status();
                match status {
                    StockStatus::Out => stats.out_of_stock += 1,
                    StockStatus::Low => stats.low_stock += 1,
                    StockStatus::Ok => {}
                }
                stats.total_value_cents += product.stock_value();
                InventoryItem { product, status }
            })
            .collect();

        Ok(InventorySummary {
            stats,
            products: items,
        })
    }

    /// A product's movement ledger, most recent first.
    ///
    /// Returned as a lazy row stream: rows are decoded as the caller pulls
    /// them, and re-calling this method restarts the sequence from a fresh
    /// query.
    pub fn history(
        &self,
        product_id: &str,
        limit: u32,
    ) -> impl Stream<Item = DbResult<StockMovement>> + '_ {
        sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, user_id, movement, quantity, reason, reference, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id.to_string())
        .bind(limit)
        .fetch(&self.pool)
        .map_err(DbError::from)
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
    use shopfront_core::Role;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database) -> String {
        db.users()
            .insert(crate::repository::user::NewUser {
                username: "manager".into(),
                password_hash: "hash".into(),
                full_name: "Test Manager".into(),
                role: Role::Manager,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_product(db: &Database, sku: &str, stock: i64, reorder: i64) -> Product {
        db.products()
            .insert(NewProduct {
                name: format!("Product {sku}"),
                sku: sku.to_string(),
                barcode: None,
                description: None,
                cost_price_cents: 50,
                selling_price_cents: 100,
                stock_quantity: stock,
                reorder_level: reorder,
                category_id: None,
                supplier_id: None,
            })
            .await
            .unwrap()
    }

    fn movement(product: &Product, kind: MovementKind, qty: i64, user: &str) -> NewMovement {
        NewMovement {
            product_id: product.id.clone(),
            movement: kind,
            quantity: qty,
            reason: None,
            reference: None,
            user_id: user.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stock_in_and_out() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let product = seed_product(&db, "A", 10, 5).await;

        let outcome = db
            .stock()
            .record_movement(movement(&product, MovementKind::In, 15, &user))
            .await
            .unwrap();
        assert_eq!(outcome.product.stock_quantity, 25);
        assert_eq!(outcome.movement.quantity, 15);
        assert_eq!(outcome.movement.reason.as_deref(), Some("Manual Stock IN"));

        let outcome = db
            .stock()
            .record_movement(movement(&product, MovementKind::Out, 5, &user))
            .await
            .unwrap();
        assert_eq!(outcome.product.stock_quantity, 20);
    }

    #[tokio::test]
    async fn test_stock_out_insufficient_fails_and_leaves_stock() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let product = seed_product(&db, "A", 50, 5).await;

        let err = db
            .stock()
            .record_movement(movement(&product, MovementKind::Out, 1000, &user))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 50,
                requested: 1000,
                ..
            })
        ));

        let after = db.products().find_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 50);

        // The failed movement left no audit row behind.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_sale_kind_rejected() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let product = seed_product(&db, "A", 10, 5).await;

        let err = db
            .stock()
            .record_movement(movement(&product, MovementKind::Sale, 1, &user))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = test_db().await;
        let user = seed_user(&db).await;

        let err = db
            .stock()
            .record_movement(NewMovement {
                product_id: "missing".into(),
                movement: MovementKind::In,
                quantity: 1,
                reason: None,
                reference: None,
                user_id: user,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_summary_classification() {
        let db = test_db().await;
        seed_product(&db, "OUT", 0, 5).await;
        seed_product(&db, "LOW", 3, 5).await;
        seed_product(&db, "OK", 50, 5).await;

        let inactive = seed_product(&db, "GONE", 7, 5).await;
        db.products().soft_delete(&inactive.id).await.unwrap();

        let summary = db.stock().summary().await.unwrap();
        assert_eq!(summary.stats.total_products, 3);
        assert_eq!(summary.stats.out_of_stock, 1);
        assert_eq!(summary.stats.low_stock, 1);
        // (0 + 3 + 50) × 100 cents
        assert_eq!(summary.stats.total_value_cents.cents(), 5300);

        // Lowest stock first.
        assert_eq!(summary.products[0].product.sku, "OUT");
        assert_eq!(summary.products[0].status, StockStatus::Out);
    }

    #[tokio::test]
    async fn test_history_is_recent_first_and_restartable() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let product = seed_product(&db, "A", 10, 5).await;

        for qty in [1, 2, 3] {
            db.stock()
                .record_movement(movement(&product, MovementKind::In, qty, &user))
                .await
                .unwrap();
        }

        let first: Vec<StockMovement> = db
            .stock()
            .history(&product.id, 2)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].quantity, 3);
        assert_eq!(first[1].quantity, 2);

        // Re-querying restarts the sequence from the top.
        let again: Vec<StockMovement> = db
            .stock()
            .history(&product.id, 2)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(again[0].id, first[0].id);
    }
}
