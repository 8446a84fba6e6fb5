//! # Drug Repository
//!
//! Database operations for drugs.
//!
//! A drug is stored across three tables: the `drugs` row itself, its
//! supplier snapshots in `drug_suppliers`, and its purchase ids in
//! `drug_purchases`. Loading joins them back in insertion order.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{column_u32, group_links, LinkRow};
use pharmacy_core::{Drug, SupplierRef};

#[derive(Debug, sqlx::FromRow)]
struct DrugRow {
    id: String,
    name: String,
    stock: i64,
    price: f64,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierLinkRow {
    drug_id: String,
    supplier_id: String,
    supplier_name: String,
}

impl DrugRow {
    fn into_drug(
        self,
        suppliers: Vec<SupplierRef>,
        purchase_ids: Vec<String>,
    ) -> DbResult<Drug> {
        let stock = column_u32("Drug", &self.id, "stock", self.stock)?;
        let quantity = column_u32("Drug", &self.id, "quantity", self.quantity)?;

        let mut drug = Drug::new(self.id, self.name, stock, self.price).with_quantity(quantity);
        drug.suppliers = suppliers;
        drug.purchase_ids = purchase_ids;
        Ok(drug)
    }
}

const SELECT_DRUGS: &str = "SELECT id, name, stock, price, quantity FROM drugs";

/// Repository for drug database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.drugs();
/// repo.upsert(&Drug::new("D1", "Amoxicillin", 10, 5.0)).await?;
/// let all = repo.load_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DrugRepository {
    pool: SqlitePool,
}

impl DrugRepository {
    /// Creates a new DrugRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DrugRepository { pool }
    }

    /// Loads every drug in catalog insertion order.
    pub async fn load_all(&self) -> DbResult<Vec<Drug>> {
        let rows = sqlx::query_as::<_, DrugRow>(&format!("{SELECT_DRUGS} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        let supplier_rows = sqlx::query_as::<_, SupplierLinkRow>(
            "SELECT drug_id, supplier_id, supplier_name FROM drug_suppliers \
             ORDER BY drug_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut suppliers: HashMap<String, Vec<SupplierRef>> = HashMap::new();
        for link in supplier_rows {
            suppliers
                .entry(link.drug_id)
                .or_default()
                .push(SupplierRef::new(link.supplier_id, link.supplier_name));
        }

        let purchase_rows = sqlx::query_as::<_, LinkRow>(
            "SELECT drug_id AS owner_id, purchase_id AS value FROM drug_purchases \
             ORDER BY drug_id, position",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut purchases = group_links(purchase_rows);

        let drugs = rows
            .into_iter()
            .map(|row| {
                let refs = suppliers.remove(&row.id).unwrap_or_default();
                let ids = purchases.remove(&row.id).unwrap_or_default();
                row.into_drug(refs, ids)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = drugs.len(), "Loaded drugs");
        Ok(drugs)
    }

    /// Gets a drug by its key.
    ///
    /// ## Returns
    /// * `Ok(Some(Drug))` - Drug found
    /// * `Ok(None)` - Drug not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Drug>> {
        let row = sqlx::query_as::<_, DrugRow>(&format!("{SELECT_DRUGS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let suppliers = sqlx::query_as::<_, SupplierLinkRow>(
            "SELECT drug_id, supplier_id, supplier_name FROM drug_suppliers \
             WHERE drug_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|link| SupplierRef::new(link.supplier_id, link.supplier_name))
        .collect();

        let purchase_ids = sqlx::query_scalar::<_, String>(
            "SELECT purchase_id FROM drug_purchases WHERE drug_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        row.into_drug(suppliers, purchase_ids).map(Some)
    }

    /// Inserts or replaces a drug together with its supplier refs and
    /// purchase ids.
    ///
    /// An existing drug keeps its position in the load order.
    pub async fn upsert(&self, drug: &Drug) -> DbResult<()> {
        debug!(id = %drug.id, suppliers = drug.suppliers.len(), "Upserting drug");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO drugs (id, name, stock, price, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                stock = excluded.stock,
                price = excluded.price,
                quantity = excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&drug.id)
        .bind(&drug.name)
        .bind(i64::from(drug.stock))
        .bind(drug.price)
        .bind(i64::from(drug.quantity))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM drug_suppliers WHERE drug_id = ?1")
            .bind(&drug.id)
            .execute(&mut *tx)
            .await?;

        for (position, supplier) in drug.suppliers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO drug_suppliers (drug_id, supplier_id, supplier_name, position) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&drug.id)
            .bind(&supplier.supplier_id)
            .bind(&supplier.name)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM drug_purchases WHERE drug_id = ?1")
            .bind(&drug.id)
            .execute(&mut *tx)
            .await?;

        for (position, purchase_id) in drug.purchase_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO drug_purchases (drug_id, purchase_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(&drug.id)
            .bind(purchase_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Sets the stock level of a drug.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Drug doesn't exist
    pub async fn update_stock(&self, id: &str, stock: u32) -> DbResult<()> {
        debug!(id = %id, stock, "Updating stock");

        let result = sqlx::query("UPDATE drugs SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(i64::from(stock))
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Drug", id));
        }

        Ok(())
    }

    /// Deletes a drug and its child rows.
    ///
    /// Purchases that reference the drug are history and stay.
    ///
    /// ## Returns
    /// * `Ok(true)` - Drug existed and was removed
    /// * `Ok(false)` - No drug with that key
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting drug");

        let result = sqlx::query("DELETE FROM drugs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts stored drugs.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drugs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
