//! # Supplier Repository
//!
//! Suppliers are informational records referenced by products.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use shopfront_core::Supplier;

const COLUMNS: &str = "id, name, contact_name, phone, email, created_at";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists suppliers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {COLUMNS} FROM suppliers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Inserts a new supplier.
    pub async fn insert(
        &self,
        name: &str,
        contact_name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Supplier> {
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            contact_name: contact_name.map(str::to_string),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        repo.insert("Acme Wholesale", Some("Jo Perera"), None, None)
            .await
            .unwrap();
        repo.insert("Beta Imports", None, Some("+94 11 234 5678"), None)
            .await
            .unwrap();

        let suppliers = repo.list().await.unwrap();
        assert_eq!(suppliers.len(), 2);
        assert_eq!(suppliers[0].name, "Acme Wholesale");
    }
}
