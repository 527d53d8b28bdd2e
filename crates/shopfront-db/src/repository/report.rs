//! # Report Repository
//!
//! Read-only row loading for the report reducers in
//! [`shopfront_core::reports`]. No mutation happens on any of these paths;
//! reports are analytical snapshots, not authoritative ledgers.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopfront_core::reports::{PaymentRow, ReportRange, SaleRow, SoldItemRow};

/// Repository for report row loading.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales in range, joined to their cashier, newest first.
    pub async fn load_sales(&self, range: ReportRange) -> DbResult<Vec<SaleRow>> {
        debug!(start = %range.start, end = %range.end, "Loading sales for report");

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                s.id AS sale_id,
                s.user_id,
                u.full_name AS cashier_name,
                s.total_cents,
                s.created_at
            FROM sales s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sold line items in range, joined to product cost/category and the
    /// sale's cashier.
    pub async fn load_sold_items(&self, range: ReportRange) -> DbResult<Vec<SoldItemRow>> {
        let rows = sqlx::query_as::<_, SoldItemRow>(
            r#"
            SELECT
                si.sale_id,
                s.user_id,
                si.product_id,
                si.name_snapshot AS product_name,
                c.name AS category,
                si.quantity,
                si.unit_price_cents,
                p.cost_price_cents,
                si.line_total_cents
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Payments whose sale falls in range.
    pub async fn load_payments(&self, range: ReportRange) -> DbResult<Vec<PaymentRow>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.method, p.amount_cents
            FROM payments p
            INNER JOIN sales s ON s.id = p.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// `(created_at, total_cents)` pairs for trend bucketing.
    pub async fn load_sale_instants(
        &self,
        range: ReportRange,
    ) -> DbResult<Vec<(chrono::DateTime<chrono::Utc>, i64)>> {
        let rows = sqlx::query_as(
            r#"
            SELECT created_at, total_cents
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
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
    use crate::repository::sale::Checkout;
    use chrono::{Days, Local};
    use shopfront_core::reports;
    use shopfront_core::{CartLine, PaymentMethod, Role};

    async fn seeded_db() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user_id = db
            .users()
            .insert(crate::repository::user::NewUser {
                username: "cashier".into(),
                password_hash: "hash".into(),
                full_name: "Test Cashier".into(),
                role: Role::Cashier,
            })
            .await
            .unwrap()
            .id;

        let category = db.categories().insert("Drinks", None).await.unwrap();
        let product = db
            .products()
            .insert(NewProduct {
                name: "Coke 330ml".into(),
                sku: "COKE-330".into(),
                barcode: None,
                description: None,
                cost_price_cents: 8000,
                selling_price_cents: 12000,
                stock_quantity: 100,
                reorder_level: 5,
                category_id: Some(category.id),
                supplier_id: None,
            })
            .await
            .unwrap();

        db.sales()
            .checkout(&Checkout {
                lines: vec![CartLine {
                    product_id: product.id,
                    quantity: 2,
                    unit_price_cents: 12000,
                }],
                discount: None,
                payment_method: PaymentMethod::Cash,
                tendered_cents: None,
                payment_reference: None,
                user_id: user_id.clone(),
                tax: None,
            })
            .await
            .unwrap();

        (db, user_id)
    }

    fn today_range() -> ReportRange {
        ReportRange::single_day(Local::now().date_naive())
    }

    #[tokio::test]
    async fn test_load_rows_and_reduce() {
        let (db, user_id) = seeded_db().await;
        let range = today_range();

        let sales = db.reports().load_sales(range).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].user_id, user_id);
        assert_eq!(sales[0].cashier_name, "Test Cashier");

        let items = db.reports().load_sold_items(range).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category.as_deref(), Some("Drinks"));
        assert_eq!(items[0].cost_price_cents, 8000);

        let summary = reports::sales_summary(&sales, &items);
        assert_eq!(summary.total_sales_cents.cents(), 24000);
        assert_eq!(summary.total_profit_cents.cents(), 8000);

        let payments = db.reports().load_payments(range).await.unwrap();
        let breakdown = reports::payment_methods(&payments);
        assert_eq!(breakdown.total_cents.cents(), 24000);
        assert_eq!(breakdown.breakdown[0].method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_empty_range_yields_empty_rows() {
        let (db, _) = seeded_db().await;

        let last_year = Local::now().date_naive() - Days::new(400);
        let range = ReportRange::single_day(last_year);

        assert!(db.reports().load_sales(range).await.unwrap().is_empty());
        assert!(db.reports().load_sold_items(range).await.unwrap().is_empty());
        assert!(db.reports().load_payments(range).await.unwrap().is_empty());

        let report = reports::payment_methods(&[]);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.total_cents.cents(), 0);
    }

    #[tokio::test]
    async fn test_load_sale_instants() {
        let (db, _) = seeded_db().await;
        let rows = db.reports().load_sale_instants(today_range()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, 24000);
    }
}
