//! # Report Reducers
//!
//! Pure aggregation over row sets loaded by the data layer.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reporting Pipeline                               │
//! │                                                                         │
//! │  HTTP request (?startDate&endDate)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportRange ── local-day window converted to UTC instants              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shopfront-db ── loads SaleRow / SoldItemRow / PaymentRow sets          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  THIS MODULE ── groups and reduces, no I/O, no mutation                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON response                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every percentage/average guards its denominator and yields exactly 0
//! when it would otherwise divide by zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PaymentMethod;

/// Fallback bucket for items whose product has no category.
const UNCATEGORIZED: &str = "Uncategorized";

// =============================================================================
// Report Range
// =============================================================================

/// A half-open UTC time window `[start, end)` derived from local calendar
/// days. "Today" is local midnight to the next local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportRange {
    /// Inclusive calendar-day range: `[start 00:00, end + 1 day 00:00)`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        ReportRange {
            start: local_midnight(start),
            end: local_midnight(end + Days::new(1)),
        }
    }

    /// A single local calendar day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self::from_dates(day, day)
    }

    /// The `days` calendar days ending at `end_day`, inclusive.
    pub fn trailing_days(end_day: NaiveDate, days: u32) -> Self {
        let span = days.max(1) as u64;
        Self::from_dates(end_day - Days::new(span - 1), end_day)
    }
}

/// UTC instant of local midnight for `date`. Falls back to treating the
/// naive time as UTC on DST gaps where local midnight does not exist.
fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

// =============================================================================
// Input Rows
// =============================================================================

/// One sale, joined to its cashier. Loaded per report range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleRow {
    pub sale_id: String,
    pub user_id: String,
    pub cashier_name: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// One sold line item, joined to its product's cost price and category and
/// to the sale's cashier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SoldItemRow {
    pub sale_id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub cost_price_cents: i64,
    pub line_total_cents: i64,
}

impl SoldItemRow {
    /// Revenue for this line: unit price × quantity.
    fn revenue(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Cost for this line: product cost price × quantity.
    fn cost(&self) -> Money {
        Money::from_cents(self.cost_price_cents).multiply_quantity(self.quantity)
    }

    /// Profit for this line: (unit price − cost price) × quantity.
    fn profit(&self) -> Money {
        self.revenue() - self.cost()
    }
}

/// One payment row inside a report range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales_cents: Money,
    pub total_transactions: i64,
    pub total_profit_cents: Money,
    pub total_items_sold: i64,
    /// 0 when there are no transactions.
    pub average_transaction_cents: Money,
}

/// Totals for a range: sales, transaction count, profit, items sold,
/// average transaction value.
pub fn sales_summary(sales: &[SaleRow], items: &[SoldItemRow]) -> SalesSummary {
    let total_sales: Money = sales.iter().map(|s| Money::from_cents(s.total_cents)).sum();
    let total_transactions = sales.len() as i64;
    let total_profit: Money = items.iter().map(SoldItemRow::profit).sum();
    let total_items_sold: i64 = items.iter().map(|i| i.quantity).sum();

    let average = if total_transactions > 0 {
        Money::from_cents(total_sales.cents() / total_transactions)
    } else {
        Money::zero()
    };

    SalesSummary {
        total_sales_cents: total_sales,
        total_transactions,
        total_profit_cents: total_profit,
        total_items_sold,
        average_transaction_cents: average,
    }
}

// =============================================================================
// Sales by Product
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub quantity_sold: i64,
    pub revenue_cents: Money,
    pub profit_cents: Money,
}

/// Groups sold items by product; sorted by revenue descending.
pub fn sales_by_product(items: &[SoldItemRow]) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<&str, ProductSales> = BTreeMap::new();

    for item in items {
        let entry = by_product
            .entry(item.product_id.as_str())
            .or_insert_with(|| ProductSales {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                category: item
                    .category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                quantity_sold: 0,
                revenue_cents: Money::zero(),
                profit_cents: Money::zero(),
            });
        entry.quantity_sold += item.quantity;
        entry.revenue_cents += item.revenue();
        entry.profit_cents += item.profit();
    }

    let mut rows: Vec<ProductSales> = by_product.into_values().collect();
    rows.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
    rows
}

// =============================================================================
// Sales by Cashier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierSales {
    pub user_id: String,
    pub cashier_name: String,
    pub transaction_count: i64,
    pub total_sales_cents: Money,
    pub total_profit_cents: Money,
}

/// Groups sales by cashier; sorted by total sales descending.
pub fn sales_by_cashier(sales: &[SaleRow], items: &[SoldItemRow]) -> Vec<CashierSales> {
    let mut by_user: BTreeMap<&str, CashierSales> = BTreeMap::new();

    for sale in sales {
        let entry = by_user
            .entry(sale.user_id.as_str())
            .or_insert_with(|| CashierSales {
                user_id: sale.user_id.clone(),
                cashier_name: sale.cashier_name.clone(),
                transaction_count: 0,
                total_sales_cents: Money::zero(),
                total_profit_cents: Money::zero(),
            });
        entry.transaction_count += 1;
        entry.total_sales_cents += Money::from_cents(sale.total_cents);
    }

    // Profit comes from line items; a cashier only appears in `items` if
    // they also appear in `sales`, so missing keys are skipped.
    for item in items {
        if let Some(entry) = by_user.get_mut(item.user_id.as_str()) {
            entry.total_profit_cents += item.profit();
        }
    }

    let mut rows: Vec<CashierSales> = by_user.into_values().collect();
    rows.sort_by(|a, b| b.total_sales_cents.cmp(&a.total_sales_cents));
    rows
}

// =============================================================================
// Payment Methods
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBreakdown {
    pub method: PaymentMethod,
    pub count: i64,
    pub amount_cents: Money,
    /// Share of the grand total, 0 when the grand total is 0.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsReport {
    pub breakdown: Vec<PaymentMethodBreakdown>,
    pub total_cents: Money,
}

/// Groups payments by method; sorted by amount descending. An empty range
/// yields an empty breakdown and total 0, never an error.
pub fn payment_methods(payments: &[PaymentRow]) -> PaymentMethodsReport {
    let mut by_method: BTreeMap<&'static str, PaymentMethodBreakdown> = BTreeMap::new();

    for payment in payments {
        let entry = by_method
            .entry(payment.method.as_str())
            .or_insert_with(|| PaymentMethodBreakdown {
                method: payment.method,
                count: 0,
                amount_cents: Money::zero(),
                percentage: 0.0,
            });
        entry.count += 1;
        entry.amount_cents += Money::from_cents(payment.amount_cents);
    }

    let total: Money = by_method.values().map(|b| b.amount_cents).sum();

    let mut breakdown: Vec<PaymentMethodBreakdown> = by_method.into_values().collect();
    for entry in &mut breakdown {
        entry.percentage = ratio_pct(entry.amount_cents.cents(), total.cents());
    }
    breakdown.sort_by(|a, b| b.amount_cents.cmp(&a.amount_cents));

    PaymentMethodsReport {
        breakdown,
        total_cents: total,
    }
}

// =============================================================================
// Profit Analysis
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProfit {
    pub category: String,
    pub revenue_cents: Money,
    pub cost_cents: Money,
    pub profit_cents: Money,
    /// profit / revenue × 100, 0 when revenue is 0.
    pub margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub total_revenue_cents: Money,
    pub total_cost_cents: Money,
    pub total_profit_cents: Money,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAnalysis {
    pub summary: ProfitSummary,
    pub category_breakdown: Vec<CategoryProfit>,
}

/// Groups sold items by product category; sorted by profit descending.
pub fn profit_analysis(items: &[SoldItemRow]) -> ProfitAnalysis {
    let mut by_category: BTreeMap<String, CategoryProfit> = BTreeMap::new();
    let mut total_revenue = Money::zero();
    let mut total_cost = Money::zero();

    for item in items {
        let category = item
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let entry = by_category
            .entry(category.clone())
            .or_insert_with(|| CategoryProfit {
                category,
                revenue_cents: Money::zero(),
                cost_cents: Money::zero(),
                profit_cents: Money::zero(),
                margin: 0.0,
            });
        entry.revenue_cents += item.revenue();
        entry.cost_cents += item.cost();
        entry.profit_cents += item.profit();

        total_revenue += item.revenue();
        total_cost += item.cost();
    }

    let mut breakdown: Vec<CategoryProfit> = by_category.into_values().collect();
    for entry in &mut breakdown {
        entry.margin = ratio_pct(entry.profit_cents.cents(), entry.revenue_cents.cents());
    }
    breakdown.sort_by(|a, b| b.profit_cents.cmp(&a.profit_cents));

    let total_profit = total_revenue - total_cost;
    ProfitAnalysis {
        summary: ProfitSummary {
            total_revenue_cents: total_revenue,
            total_cost_cents: total_cost,
            total_profit_cents: total_profit,
            profit_margin: ratio_pct(total_profit.cents(), total_revenue.cents()),
        },
        category_breakdown: breakdown,
    }
}

// =============================================================================
// Top Products & Sales Trend (dashboard variants)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue_cents: Money,
}

/// Best sellers by quantity, capped at `limit`.
pub fn top_products(items: &[SoldItemRow], limit: usize) -> Vec<TopProduct> {
    let mut rows: Vec<TopProduct> = sales_by_product(items)
        .into_iter()
        .map(|p| TopProduct {
            product_id: p.product_id,
            product_name: p.product_name,
            quantity_sold: p.quantity_sold,
            revenue_cents: p.revenue_cents,
        })
        .collect();
    rows.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_cents: Money,
    pub count: i64,
    /// 0 when the day has no sales.
    pub average_cents: Money,
}

/// Buckets `(local day, sale total)` pairs into one point per calendar day,
/// oldest first. Days without sales yield zero points rather than gaps.
pub fn sales_trend(rows: &[(NaiveDate, i64)], end_day: NaiveDate, days: u32) -> Vec<TrendPoint> {
    let days = days.max(1);
    let start = end_day - Days::new(days as u64 - 1);

    let mut totals: BTreeMap<NaiveDate, (Money, i64)> = BTreeMap::new();
    for (day, cents) in rows {
        let entry = totals.entry(*day).or_insert((Money::zero(), 0));
        entry.0 += Money::from_cents(*cents);
        entry.1 += 1;
    }

    (0..days)
        .map(|offset| {
            let date = start + Days::new(offset as u64);
            let (total, count) = totals.get(&date).copied().unwrap_or((Money::zero(), 0));
            let average = if count > 0 {
                Money::from_cents(total.cents() / count)
            } else {
                Money::zero()
            };
            TrendPoint {
                date,
                total_cents: total,
                count,
                average_cents: average,
            }
        })
        .collect()
}

// =============================================================================
// Helpers
// =============================================================================

/// `part / whole × 100`, yielding exactly 0 when `whole` is 0.
fn ratio_pct(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(
        sale: &str,
        user: &str,
        product: &str,
        category: Option<&str>,
        qty: i64,
        price: i64,
        cost: i64,
    ) -> SoldItemRow {
        SoldItemRow {
            sale_id: sale.to_string(),
            user_id: user.to_string(),
            product_id: product.to_string(),
            product_name: format!("Product {product}"),
            category: category.map(str::to_string),
            quantity: qty,
            unit_price_cents: price,
            cost_price_cents: cost,
            line_total_cents: price * qty,
        }
    }

    fn sale(id: &str, user: &str, total: i64) -> SaleRow {
        SaleRow {
            sale_id: id.to_string(),
            user_id: user.to_string(),
            cashier_name: format!("Cashier {user}"),
            total_cents: total,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sales_summary() {
        let sales = vec![sale("s1", "u1", 32000), sale("s2", "u1", 10000)];
        let items = vec![
            item("s1", "u1", "p1", None, 2, 12000, 8000),
            item("s1", "u1", "p2", None, 1, 8000, 5000),
            item("s2", "u1", "p1", None, 1, 10000, 8000),
        ];

        let summary = sales_summary(&sales, &items);
        assert_eq!(summary.total_sales_cents.cents(), 42000);
        assert_eq!(summary.total_transactions, 2);
        // (12000-8000)*2 + (8000-5000)*1 + (10000-8000)*1 = 13000
        assert_eq!(summary.total_profit_cents.cents(), 13000);
        assert_eq!(summary.total_items_sold, 4);
        assert_eq!(summary.average_transaction_cents.cents(), 21000);
    }

    #[test]
    fn test_sales_summary_empty_range() {
        let summary = sales_summary(&[], &[]);
        assert_eq!(summary.total_sales_cents.cents(), 0);
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.average_transaction_cents.cents(), 0);
    }

    #[test]
    fn test_sales_by_product_sorted_by_revenue() {
        let items = vec![
            item("s1", "u1", "cheap", None, 5, 100, 50),
            item("s1", "u1", "dear", Some("Drinks"), 1, 5000, 3000),
            item("s2", "u1", "cheap", None, 2, 100, 50),
        ];

        let rows = sales_by_product(&items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, "dear");
        assert_eq!(rows[0].category, "Drinks");
        assert_eq!(rows[0].revenue_cents.cents(), 5000);
        assert_eq!(rows[1].product_id, "cheap");
        assert_eq!(rows[1].quantity_sold, 7);
        assert_eq!(rows[1].revenue_cents.cents(), 700);
        assert_eq!(rows[1].category, "Uncategorized");
    }

    #[test]
    fn test_sales_by_cashier() {
        let sales = vec![
            sale("s1", "alice", 10000),
            sale("s2", "bob", 4000),
            sale("s3", "alice", 6000),
        ];
        let items = vec![
            item("s1", "alice", "p1", None, 1, 10000, 6000),
            item("s2", "bob", "p1", None, 1, 4000, 3000),
            item("s3", "alice", "p2", None, 2, 3000, 2000),
        ];

        let rows = sales_by_cashier(&sales, &items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "alice");
        assert_eq!(rows[0].transaction_count, 2);
        assert_eq!(rows[0].total_sales_cents.cents(), 16000);
        assert_eq!(rows[0].total_profit_cents.cents(), 6000);
        assert_eq!(rows[1].user_id, "bob");
        assert_eq!(rows[1].total_profit_cents.cents(), 1000);
    }

    #[test]
    fn test_payment_methods_percentages() {
        let payments = vec![
            PaymentRow {
                method: PaymentMethod::Cash,
                amount_cents: 7500,
            },
            PaymentRow {
                method: PaymentMethod::Card,
                amount_cents: 2500,
            },
            PaymentRow {
                method: PaymentMethod::Cash,
                amount_cents: 0,
            },
        ];

        let report = payment_methods(&payments);
        assert_eq!(report.total_cents.cents(), 10000);
        assert_eq!(report.breakdown[0].method, PaymentMethod::Cash);
        assert_eq!(report.breakdown[0].count, 2);
        assert!((report.breakdown[0].percentage - 75.0).abs() < f64::EPSILON);
        assert!((report.breakdown[1].percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_payment_methods_empty_range() {
        let report = payment_methods(&[]);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.total_cents.cents(), 0);
    }

    #[test]
    fn test_profit_analysis_margin_guards_zero_revenue() {
        let items = vec![item("s1", "u1", "free", Some("Promo"), 3, 0, 0)];
        let analysis = profit_analysis(&items);
        assert_eq!(analysis.summary.profit_margin, 0.0);
        assert_eq!(analysis.category_breakdown[0].margin, 0.0);
    }

    #[test]
    fn test_profit_analysis_sorted_by_profit() {
        let items = vec![
            item("s1", "u1", "p1", Some("Drinks"), 1, 1000, 900),
            item("s1", "u1", "p2", Some("Snacks"), 1, 1000, 200),
        ];

        let analysis = profit_analysis(&items);
        assert_eq!(analysis.category_breakdown[0].category, "Snacks");
        assert_eq!(analysis.category_breakdown[0].profit_cents.cents(), 800);
        assert!((analysis.category_breakdown[0].margin - 80.0).abs() < f64::EPSILON);
        assert_eq!(analysis.summary.total_profit_cents.cents(), 900);
    }

    #[test]
    fn test_top_products_caps_and_sorts_by_quantity() {
        let items = vec![
            item("s1", "u1", "a", None, 10, 100, 50),
            item("s1", "u1", "b", None, 3, 9000, 100),
            item("s2", "u1", "c", None, 5, 200, 50),
        ];

        let top = top_products(&items, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "a");
        assert_eq!(top[1].product_id, "c");
    }

    #[test]
    fn test_sales_trend_fills_empty_days() {
        let end = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let rows = vec![
            (NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), 5000),
            (NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), 3000),
            (NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), 1000),
        ];

        let trend = sales_trend(&rows, end, 3);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        assert_eq!(trend[0].total_cents.cents(), 0);
        assert_eq!(trend[0].average_cents.cents(), 0);
        assert_eq!(trend[1].total_cents.cents(), 8000);
        assert_eq!(trend[1].count, 2);
        assert_eq!(trend[1].average_cents.cents(), 4000);
        assert_eq!(trend[2].total_cents.cents(), 1000);
    }

    #[test]
    fn test_report_range_spans_inclusive_days() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let range = ReportRange::from_dates(start, end);
        assert_eq!((range.end - range.start).num_days(), 3);

        let single = ReportRange::single_day(start);
        assert_eq!((single.end - single.start).num_days(), 1);

        let trailing = ReportRange::trailing_days(end, 7);
        assert_eq!((trailing.end - trailing.start).num_days(), 7);
    }
}
