//! # Supplier Repository
//!
//! Database operations for suppliers and the drug keys each one supplies.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{group_links, LinkRow};
use pharmacy_core::Supplier;

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: String,
    name: String,
    contact_info: String,
}

impl SupplierRow {
    fn into_supplier(self, supplied_drug_ids: Vec<String>) -> Supplier {
        let mut supplier = Supplier::new(self.id, self.name, self.contact_info);
        supplier.supplied_drug_ids = supplied_drug_ids;
        supplier
    }
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Loads every supplier with its supplied drug keys.
    pub async fn load_all(&self) -> DbResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, contact_info FROM suppliers ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query_as::<_, LinkRow>(
            "SELECT supplier_id AS owner_id, drug_id AS value FROM supplier_drugs \
             ORDER BY supplier_id, position",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut supplied = group_links(links);

        let suppliers: Vec<Supplier> = rows
            .into_iter()
            .map(|row| {
                let drug_ids = supplied.remove(&row.id).unwrap_or_default();
                row.into_supplier(drug_ids)
            })
            .collect();

        debug!(count = suppliers.len(), "Loaded suppliers");
        Ok(suppliers)
    }

    /// Gets a supplier by its key.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, contact_info FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let drug_ids = sqlx::query_scalar::<_, String>(
            "SELECT drug_id FROM supplier_drugs WHERE supplier_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_supplier(drug_ids)))
    }

    /// Inserts or replaces a supplier and its supplied drug keys.
    pub async fn upsert(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(
            id = %supplier.id,
            drugs = supplier.supplied_drug_ids.len(),
            "Upserting supplier"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_info, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                contact_info = excluded.contact_info,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_info)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM supplier_drugs WHERE supplier_id = ?1")
            .bind(&supplier.id)
            .execute(&mut *tx)
            .await?;

        for (position, drug_id) in supplier.supplied_drug_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO supplier_drugs (supplier_id, drug_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(&supplier.id)
            .bind(drug_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a supplier. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts stored suppliers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
