//! # Sale Repository
//!
//! Sale reads and the checkout unit of work.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Unit of Work                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. load each cart line's product (active only)                       │
//! │       └── missing → ProductNotFound, price drift → PriceMismatch        │
//! │    2. compute subtotal / discount / tax / total (shopfront-core)        │
//! │    3. INSERT sale                                                       │
//! │    4. INSERT one sale_item per line (name + price snapshot)             │
//! │    5. INSERT one payment                                                │
//! │    6. per line: UPDATE products                                         │
//! │         SET stock_quantity = stock_quantity - q                         │
//! │         WHERE id = ? AND stock_quantity >= q                            │
//! │       └── 0 rows → InsufficientStock                                    │
//! │    7. per line: INSERT stock_movement (sale, -q, "Sale #<id>")          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT rolls the whole transaction back: no partial   │
//! │  sale, payment, movement, or stock decrement is ever observable.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock decrement is a relative, guarded UPDATE rather than a
//! read-then-write, so two concurrent checkouts of the same product cannot
//! both pass a stale stock check and oversell.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::COLUMNS as PRODUCT_COLUMNS;
use shopfront_core::reports::ReportRange;
use shopfront_core::totals::compute_totals;
use shopfront_core::{
    CartLine, CoreError, Discount, MovementKind, Payment, PaymentMethod, Product, Rate, Sale,
    SaleItem, SaleTotals,
};

const SALE_COLUMNS: &str =
    "id, user_id, subtotal_cents, discount_cents, tax_cents, total_cents, created_at";
const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, name_snapshot, quantity, unit_price_cents, line_total_cents";
const PAYMENT_COLUMNS: &str = "id, sale_id, method, amount_cents, reference, created_at";

// =============================================================================
// Input / Output Types
// =============================================================================

/// A validated checkout request, assembled by the API layer.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub lines: Vec<CartLine>,
    pub discount: Option<Discount>,
    pub payment_method: PaymentMethod,
    /// Cash received from the customer; the payment records the total when
    /// absent.
    pub tendered_cents: Option<i64>,
    pub payment_reference: Option<String>,
    /// Acting cashier, from the authenticated session.
    pub user_id: String,
    /// Tax rate from Settings, `None` when tax is disabled.
    pub tax: Option<Rate>,
}

/// Everything the receipt needs, returned from a committed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payment: Payment,
    pub totals: SaleTotals,
    pub change_cents: i64,
}

/// A sale with its line items and payments, for read paths.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithDetails {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<Payment>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Runs the checkout unit of work, retrying once when SQLite reports
    /// the database busy (two writers contending for the same rows).
    pub async fn checkout(&self, checkout: &Checkout) -> DbResult<CheckoutReceipt> {
        if checkout.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        match self.checkout_once(checkout).await {
            Err(err) if err.is_busy() => {
                warn!(error = %err, "Checkout hit a busy database, retrying once");
                self.checkout_once(checkout).await
            }
            other => other,
        }
    }

    async fn checkout_once(&self, checkout: &Checkout) -> DbResult<CheckoutReceipt> {
        let mut tx = self.pool.begin().await?;

        // Resolve every line against the live catalog. Submitted prices are
        // re-validated; the product table is authoritative.
        let mut resolved: Vec<Product> = Vec::with_capacity(checkout.lines.len());
        for line in &checkout.lines {
            let product = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
            ))
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if line.unit_price_cents != product.selling_price_cents {
                return Err(CoreError::PriceMismatch {
                    name: product.name,
                    submitted: line.unit_price_cents,
                    current: product.selling_price_cents,
                }
                .into());
            }

            resolved.push(product);
        }

        let totals = compute_totals(&checkout.lines, checkout.discount, checkout.tax)?;

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let sale = Sale {
            id: sale_id.clone(),
            user_id: checkout.user_id.clone(),
            subtotal_cents: totals.subtotal_cents.cents(),
            discount_cents: totals.discount_cents.cents(),
            tax_cents: totals.tax_cents.cents(),
            total_cents: totals.total_cents.cents(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, user_id, subtotal_cents, discount_cents, tax_cents,
                total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items: Vec<SaleItem> = Vec::with_capacity(checkout.lines.len());
        for (line, product) in checkout.lines.iter().zip(&resolved) {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total().cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, name_snapshot,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        let amount_cents = checkout.tendered_cents.unwrap_or(sale.total_cents);
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            method: checkout.payment_method,
            amount_cents,
            reference: checkout.payment_reference.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO payments (id, sale_id, method, amount_cents, reference, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(&payment.reference)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        for (line, product) in checkout.lines.iter().zip(&resolved) {
            // Relative guarded decrement: the WHERE clause makes overselling
            // impossible even under concurrent checkouts.
            let updated = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?1, updated_at = ?2
                WHERE id = ?3 AND stock_quantity >= ?1
                "#,
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&product.id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }

            sqlx::query(
                r#"
                INSERT INTO stock_movements (
                    id, product_id, user_id, movement, quantity, reason, reference, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&product.id)
            .bind(&checkout.user_id)
            .bind(MovementKind::Sale)
            .bind(-line.quantity)
            .bind(format!("Sale #{sale_id}"))
            .bind(Option::<String>::None)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let change_cents = (amount_cents - sale.total_cents).max(0);

        info!(
            sale_id = %sale_id,
            total = %totals.total_cents,
            items = items.len(),
            "Sale completed"
        );

        Ok(CheckoutReceipt {
            sale,
            items,
            payment,
            totals,
            change_cents,
        })
    }

    /// Lists sales, newest first, optionally constrained to a range.
    pub async fn list(
        &self,
        range: Option<ReportRange>,
        limit: u32,
    ) -> DbResult<Vec<SaleWithDetails>> {
        let sales: Vec<Sale> = match range {
            Some(range) => {
                sqlx::query_as::<_, Sale>(&format!(
                    r#"
                    SELECT {SALE_COLUMNS} FROM sales
                    WHERE created_at >= ?1 AND created_at < ?2
                    ORDER BY created_at DESC
                    LIMIT ?3
                    "#
                ))
                .bind(range.start)
                .bind(range.end)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Sale>(&format!(
                    "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut detailed = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.items_for(&sale.id).await?;
            let payments = self.payments_for(&sale.id).await?;
            detailed.push(SaleWithDetails {
                sale,
                items,
                payments,
            });
        }

        Ok(detailed)
    }

    /// Gets a sale with its items and payments.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<SaleWithDetails>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        debug!(sale_id = %sale.id, "Loading sale details");

        let items = self.items_for(&sale.id).await?;
        let payments = self.payments_for(&sale.id).await?;

        Ok(Some(SaleWithDetails {
            sale,
            items,
            payments,
        }))
    }

    /// Counts all sales ever recorded.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn items_for(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn payments_for(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE sale_id = ?1 ORDER BY created_at"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
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
                username: "cashier".into(),
                password_hash: "hash".into(),
                full_name: "Test Cashier".into(),
                role: Role::Cashier,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_product(db: &Database, sku: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(NewProduct {
                name: format!("Product {sku}"),
                sku: sku.to_string(),
                barcode: None,
                description: None,
                cost_price_cents: price / 2,
                selling_price_cents: price,
                stock_quantity: stock,
                reorder_level: 5,
                category_id: None,
                supplier_id: None,
            })
            .await
            .unwrap()
    }

    fn line(product: &Product, qty: i64) -> CartLine {
        CartLine {
            product_id: product.id.clone(),
            quantity: qty,
            unit_price_cents: product.selling_price_cents,
        }
    }

    fn cash_checkout(lines: Vec<CartLine>, user_id: &str) -> Checkout {
        Checkout {
            lines,
            discount: None,
            payment_method: PaymentMethod::Cash,
            tendered_cents: None,
            payment_reference: None,
            user_id: user_id.to_string(),
            tax: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let a = seed_product(&db, "A", 12000, 10).await;
        let b = seed_product(&db, "B", 8000, 10).await;

        let receipt = db
            .sales()
            .checkout(&cash_checkout(vec![line(&a, 2), line(&b, 1)], &user_id))
            .await
            .unwrap();

        assert_eq!(receipt.sale.subtotal_cents, 32000);
        assert_eq!(receipt.sale.total_cents, 32000);
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.payment.amount_cents, 32000);
        assert_eq!(receipt.change_cents, 0);

        // Stock decremented by exactly the sold quantity.
        let a_after = db.products().find_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 8);

        // Exactly one sale movement of -q referencing the sale.
        let movements: Vec<(String, i64, String)> = sqlx::query_as(
            "SELECT movement, quantity, reason FROM stock_movements WHERE product_id = ?1",
        )
        .bind(&a.id)
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].0, "sale");
        assert_eq!(movements[0].1, -2);
        assert_eq!(movements[0].2, format!("Sale #{}", receipt.sale.id));
    }

    #[tokio::test]
    async fn test_checkout_with_tax_and_discount() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let a = seed_product(&db, "A", 12000, 10).await;
        let b = seed_product(&db, "B", 8000, 10).await;

        let receipt = db
            .sales()
            .checkout(&Checkout {
                lines: vec![line(&a, 2), line(&b, 1)],
                discount: Some(Discount::Percentage(1000)),
                payment_method: PaymentMethod::Cash,
                tendered_cents: Some(35000),
                payment_reference: None,
                user_id,
                tax: Some(Rate::from_bps(500)),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.discount_cents, 3200);
        assert_eq!(receipt.sale.tax_cents, 1440);
        assert_eq!(receipt.sale.total_cents, 30240);
        assert_eq!(receipt.payment.amount_cents, 35000);
        assert_eq!(receipt.change_cents, 4760);
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let plenty = seed_product(&db, "PLENTY", 1000, 100).await;
        let scarce = seed_product(&db, "SCARCE", 2000, 1).await;

        let err = db
            .sales()
            .checkout(&cash_checkout(
                vec![line(&plenty, 5), line(&scarce, 3)],
                &user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 3, .. })
        ));

        // Nothing from the failed checkout is observable.
        let plenty_after = db.products().find_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(plenty_after.stock_quantity, 100);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        let movements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(movements, 0);

        let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(payments, 0);
    }

    #[tokio::test]
    async fn test_checkout_unknown_product() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;

        let err = db
            .sales()
            .checkout(&cash_checkout(
                vec![CartLine {
                    product_id: "missing".into(),
                    quantity: 1,
                    unit_price_cents: 1000,
                }],
                &user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_rejects_stale_price() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let product = seed_product(&db, "A", 12000, 10).await;

        let err = db
            .sales()
            .checkout(&cash_checkout(
                vec![CartLine {
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_cents: 9999,
                }],
                &user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PriceMismatch { .. })
        ));

        let after = db.products().find_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;

        let err = db
            .sales()
            .checkout(&cash_checkout(vec![], &user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_list_and_find_by_id() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let product = seed_product(&db, "A", 12000, 10).await;

        let receipt = db
            .sales()
            .checkout(&cash_checkout(vec![line(&product, 1)], &user_id))
            .await
            .unwrap();

        let listed = db.sales().list(None, 50).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].items.len(), 1);
        assert_eq!(listed[0].payments.len(), 1);

        let found = db.sales().find_by_id(&receipt.sale.id).await.unwrap();
        assert!(found.is_some());

        let missing = db.sales().find_by_id("missing").await.unwrap();
        assert!(missing.is_none());
    }
}
