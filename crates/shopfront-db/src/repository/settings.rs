//! # Settings Repository
//!
//! The shop configuration singleton (row id = 1).
//!
//! The row is provisioned by an explicit [`SettingsRepository::ensure_defaults`]
//! call at startup rather than lazily on a hot read path, so `get()` can
//! assume it exists.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use shopfront_core::validation::validate_rate_bps;
use shopfront_core::{CoreError, Settings, ValidationError};

const COLUMNS: &str = "id, shop_name, shop_address, shop_phone, tax_enabled, tax_rate_bps, \
     tax_label, currency_code, currency_symbol, receipt_header, receipt_footer, \
     low_stock_threshold, updated_at";

/// Partial settings update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub shop_phone: Option<String>,
    pub tax_enabled: Option<bool>,
    pub tax_rate_bps: Option<u32>,
    pub tax_label: Option<String>,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Creates the settings row with defaults if it doesn't exist yet.
    /// Called once at startup; idempotent.
    pub async fn ensure_defaults(&self) -> DbResult<Settings> {
        let defaults = default_settings();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO settings (
                id, shop_name, shop_address, shop_phone,
                tax_enabled, tax_rate_bps, tax_label,
                currency_code, currency_symbol,
                receipt_header, receipt_footer,
                low_stock_threshold, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(defaults.id)
        .bind(&defaults.shop_name)
        .bind(&defaults.shop_address)
        .bind(&defaults.shop_phone)
        .bind(defaults.tax_enabled)
        .bind(defaults.tax_rate_bps)
        .bind(&defaults.tax_label)
        .bind(&defaults.currency_code)
        .bind(&defaults.currency_symbol)
        .bind(&defaults.receipt_header)
        .bind(&defaults.receipt_footer)
        .bind(defaults.low_stock_threshold)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!("Provisioned default settings");
        }

        self.get().await
    }

    /// Reads the settings row.
    pub async fn get(&self) -> DbResult<Settings> {
        let settings =
            sqlx::query_as::<_, Settings>(&format!("SELECT {COLUMNS} FROM settings WHERE id = 1"))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Settings", "1"))?;

        Ok(settings)
    }

    /// Applies a partial update and returns the new settings.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - tax rate above 100% or negative threshold
    pub async fn update(&self, patch: SettingsPatch) -> DbResult<Settings> {
        if let Some(bps) = patch.tax_rate_bps {
            validate_rate_bps(bps).map_err(CoreError::from)?;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            if threshold < 0 {
                return Err(CoreError::from(ValidationError::MustBePositive {
                    field: "lowStockThreshold".to_string(),
                })
                .into());
            }
        }

        debug!("Updating settings");

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE settings SET
                shop_name = COALESCE(?1, shop_name),
                shop_address = COALESCE(?2, shop_address),
                shop_phone = COALESCE(?3, shop_phone),
                tax_enabled = COALESCE(?4, tax_enabled),
                tax_rate_bps = COALESCE(?5, tax_rate_bps),
                tax_label = COALESCE(?6, tax_label),
                currency_code = COALESCE(?7, currency_code),
                currency_symbol = COALESCE(?8, currency_symbol),
                receipt_header = COALESCE(?9, receipt_header),
                receipt_footer = COALESCE(?10, receipt_footer),
                low_stock_threshold = COALESCE(?11, low_stock_threshold),
                updated_at = ?12
            WHERE id = 1
            "#,
        )
        .bind(&patch.shop_name)
        .bind(&patch.shop_address)
        .bind(&patch.shop_phone)
        .bind(patch.tax_enabled)
        .bind(patch.tax_rate_bps)
        .bind(&patch.tax_label)
        .bind(&patch.currency_code)
        .bind(&patch.currency_symbol)
        .bind(&patch.receipt_header)
        .bind(&patch.receipt_footer)
        .bind(patch.low_stock_threshold)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get().await
    }

    /// Resets every field back to the defaults.
    pub async fn reset(&self) -> DbResult<Settings> {
        info!("Resetting settings to defaults");

        let defaults = default_settings();

        sqlx::query(
            r#"
            UPDATE settings SET
                shop_name = ?1,
                shop_address = ?2,
                shop_phone = ?3,
                tax_enabled = ?4,
                tax_rate_bps = ?5,
                tax_label = ?6,
                currency_code = ?7,
                currency_symbol = ?8,
                receipt_header = ?9,
                receipt_footer = ?10,
                low_stock_threshold = ?11,
                updated_at = ?12
            WHERE id = 1
            "#,
        )
        .bind(&defaults.shop_name)
        .bind(&defaults.shop_address)
        .bind(&defaults.shop_phone)
        .bind(defaults.tax_enabled)
        .bind(defaults.tax_rate_bps)
        .bind(&defaults.tax_label)
        .bind(&defaults.currency_code)
        .bind(&defaults.currency_symbol)
        .bind(&defaults.receipt_header)
        .bind(&defaults.receipt_footer)
        .bind(defaults.low_stock_threshold)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        self.get().await
    }
}

/// Out-of-the-box configuration: tax off, LKR currency, threshold 10.
fn default_settings() -> Settings {
    Settings {
        id: 1,
        shop_name: "Shopfront POS".to_string(),
        shop_address: None,
        shop_phone: None,
        tax_enabled: false,
        tax_rate_bps: 0,
        tax_label: "VAT".to_string(),
        currency_code: "LKR".to_string(),
        currency_symbol: "Rs.".to_string(),
        receipt_header: None,
        receipt_footer: "Thank you for your business!".to_string(),
        low_stock_threshold: 10,
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopfront_core::Rate;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let db = test_db().await;
        let repo = db.settings();

        let first = repo.ensure_defaults().await.unwrap();
        assert_eq!(first.shop_name, "Shopfront POS");
        assert!(!first.tax_enabled);

        // Second call must not clobber changes.
        repo.update(SettingsPatch {
            shop_name: Some("Corner Shop".into()),
            ..Default::default()
        })
        .await
        .unwrap();

        let second = repo.ensure_defaults().await.unwrap();
        assert_eq!(second.shop_name, "Corner Shop");
    }

    #[tokio::test]
    async fn test_update_and_tax_rate() {
        let db = test_db().await;
        let repo = db.settings();
        repo.ensure_defaults().await.unwrap();

        let updated = repo
            .update(SettingsPatch {
                tax_enabled: Some(true),
                tax_rate_bps: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(updated.tax_enabled);
        assert_eq!(updated.tax_rate(), Some(Rate::from_bps(500)));
        // Untouched fields survive.
        assert_eq!(updated.currency_code, "LKR");
    }

    #[tokio::test]
    async fn test_update_rejects_bad_rate() {
        let db = test_db().await;
        let repo = db.settings();
        repo.ensure_defaults().await.unwrap();

        let err = repo
            .update(SettingsPatch {
                tax_rate_bps: Some(10001),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = repo
            .update(SettingsPatch {
                low_stock_threshold: Some(-1),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reset() {
        let db = test_db().await;
        let repo = db.settings();
        repo.ensure_defaults().await.unwrap();

        repo.update(SettingsPatch {
            shop_name: Some("Corner Shop".into()),
            tax_enabled: Some(true),
            tax_rate_bps: Some(800),
            ..Default::default()
        })
        .await
        .unwrap();

        let reset = repo.reset().await.unwrap();
        assert_eq!(reset.shop_name, "Shopfront POS");
        assert!(!reset.tax_enabled);
        assert_eq!(reset.tax_rate_bps, 0);
    }
}
