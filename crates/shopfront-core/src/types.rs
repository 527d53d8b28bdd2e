//! # Domain Types
//!
//! Core domain types used throughout Shopfront POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  user_id (FK)   │   │  product_id     │       │
//! │  │  stock_quantity │   │  total_cents    │   │  movement       │       │
//! │  │  reorder_level  │   │  immutable      │   │  signed qty     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Role        │   │ PaymentMethod   │   │  MovementKind   │       │
//! │  │  Admin          │   │  Cash           │   │  In             │       │
//! │  │  Manager        │   │  Card           │   │  Out            │       │
//! │  │  Cashier        │   │  Mobile         │   │  Sale           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale, SaleItem, Payment and StockMovement form an append-only ledger:
//! created together at checkout and never updated afterwards. Product and
//! Settings are the only mutable, long-lived entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

// =============================================================================
// Role & Capabilities
// =============================================================================

/// User roles, as a closed enum rather than a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

/// Actions that are gated by role.
///
/// Authorization checks go through [`Role::can`] so the mapping lives in
/// exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Ring up sales at the till.
    Sell,
    /// Create/update/deactivate products and categories.
    ManageCatalog,
    /// Record manual stock movements.
    AdjustStock,
    /// Read reports and the dashboard.
    ViewReports,
    /// Register users and change their roles.
    ManageUsers,
    /// Update or reset shop settings.
    ManageSettings,
}

impl Role {
    /// Checks whether this role is allowed to perform `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            Role::Manager => !matches!(capability, ManageUsers | ManageSettings),
            Role::Cashier => matches!(capability, Sell | ViewReports),
        }
    }
}

// =============================================================================
// Payment Method & Movement Kind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Mobile wallet / QR payment.
    Mobile,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

/// The kind of a stock movement ledger entry.
///
/// `In`/`Out` are manual adjustments; `Sale` entries are appended by
/// checkout with a negated quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
    Sale,
}

// =============================================================================
// User
// =============================================================================

/// A staff account. Deactivated rather than deleted so historical sales
/// keep their cashier reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// argon2 hash, never serialized to the wire.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Category & Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `stock_quantity` is only ever mutated through checkout or a stock
/// movement, both of which guard against driving it below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    pub stock_quantity: i64,
    /// Stock at or below this level flags the product as "low stock".
    pub reorder_level: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived stock level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Out,
    Low,
    Ok,
}

impl Product {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Classifies current stock against the reorder level.
    pub fn stock_status(&self) -> StockStatus {
        if self.stock_quantity == 0 {
            StockStatus::Out
        } else if self.stock_quantity <= self.reorder_level {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    /// Value of the stock on hand at the current selling price.
    pub fn stock_value(&self) -> Money {
        self.selling_price().multiply_quantity(self.stock_quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub user_id: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    /// Invariant: `total_cents == subtotal_cents - discount_cents + tax_cents`,
    /// computed once at checkout and never recomputed.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A payment towards a sale. Checkout records exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// An append-only ledger entry recording a change to a product's stock.
///
/// `quantity` is positive for `In`/`Out` entries (the kind carries the
/// direction) and negative for `Sale` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub movement: MovementKind,
    pub quantity: i64,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Settings
// =============================================================================

/// Shop-wide configuration. A singleton row (id = 1) provisioned explicitly
/// at startup via `SettingsRepository::ensure_defaults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: i64,
    pub shop_name: String,
    pub shop_address: Option<String>,
    pub shop_phone: Option<String>,
    pub tax_enabled: bool,
    /// Tax rate in basis points (500 = 5%).
    pub tax_rate_bps: u32,
    pub tax_label: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub receipt_header: Option<String>,
    pub receipt_footer: String,
    pub low_stock_threshold: i64,
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    /// The tax rate to apply at checkout, `None` when tax is disabled.
    pub fn tax_rate(&self) -> Option<Rate> {
        if self.tax_enabled {
            Some(Rate::from_bps(self.tax_rate_bps))
        } else {
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, reorder: i64) -> Product {
        Product {
            id: "p1".into(),
            name: "Test".into(),
            sku: "TEST-1".into(),
            barcode: None,
            description: None,
            cost_price_cents: 100,
            selling_price_cents: 250,
            stock_quantity: stock,
            reorder_level: reorder,
            category_id: None,
            supplier_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_status_classification() {
        assert_eq!(product(0, 10).stock_status(), StockStatus::Out);
        assert_eq!(product(1, 10).stock_status(), StockStatus::Low);
        assert_eq!(product(10, 10).stock_status(), StockStatus::Low);
        assert_eq!(product(11, 10).stock_status(), StockStatus::Ok);
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(product(4, 10).stock_value().cents(), 1000);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can(Capability::ManageSettings));
        assert!(Role::Admin.can(Capability::Sell));

        assert!(Role::Manager.can(Capability::ManageCatalog));
        assert!(Role::Manager.can(Capability::AdjustStock));
        assert!(!Role::Manager.can(Capability::ManageUsers));
        assert!(!Role::Manager.can(Capability::ManageSettings));

        assert!(Role::Cashier.can(Capability::Sell));
        assert!(Role::Cashier.can(Capability::ViewReports));
        assert!(!Role::Cashier.can(Capability::AdjustStock));
        assert!(!Role::Cashier.can(Capability::ManageCatalog));
    }

    #[test]
    fn test_settings_tax_rate() {
        let mut settings = Settings {
            id: 1,
            shop_name: "Shopfront".into(),
            shop_address: None,
            shop_phone: None,
            tax_enabled: true,
            tax_rate_bps: 500,
            tax_label: "VAT".into(),
            currency_code: "LKR".into(),
            currency_symbol: "Rs.".into(),
            receipt_header: None,
            receipt_footer: "Thank you!".into(),
            low_stock_threshold: 10,
            updated_at: Utc::now(),
        };

        assert_eq!(settings.tax_rate(), Some(Rate::from_bps(500)));

        settings.tax_enabled = false;
        assert_eq!(settings.tax_rate(), None);
    }
}
