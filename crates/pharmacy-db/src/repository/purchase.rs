//! # Purchase Repository
//!
//! Append-only purchase history. Rows are never updated; a purchase keeps
//! the unit price it was made at.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::column_u32;
use pharmacy_core::Purchase;

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    drug_id: String,
    customer_id: String,
    quantity: i64,
    unit_price: f64,
    purchased_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DbError;

    fn try_from(row: PurchaseRow) -> DbResult<Self> {
        let quantity = column_u32("Purchase", &row.id, "quantity", row.quantity)?;
        Ok(Purchase {
            id: row.id,
            drug_id: row.drug_id,
            customer_id: row.customer_id,
            quantity,
            unit_price: row.unit_price,
            purchased_at: row.purchased_at,
        })
    }
}

const SELECT_PURCHASES: &str =
    "SELECT id, drug_id, customer_id, quantity, unit_price, purchased_at FROM purchases";

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Loads every purchase in the order it was recorded.
    pub async fn load_all(&self) -> DbResult<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!("{SELECT_PURCHASES} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        let purchases = rows
            .into_iter()
            .map(Purchase::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = purchases.len(), "Loaded purchases");
        Ok(purchases)
    }

    /// Lists one customer's purchases, oldest first.
    pub async fn for_customer(&self, customer_id: &str) -> DbResult<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "{SELECT_PURCHASES} WHERE customer_id = ?1 ORDER BY rowid"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Purchase::try_from).collect()
    }

    /// Records a purchase.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - A purchase with this id exists
    pub async fn insert(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(
            id = %purchase.id,
            drug_id = %purchase.drug_id,
            customer_id = %purchase.customer_id,
            quantity = purchase.quantity,
            "Inserting purchase"
        );

        sqlx::query(
            r#"
            INSERT INTO purchases (id, drug_id, customer_id, quantity, unit_price, purchased_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.drug_id)
        .bind(&purchase.customer_id)
        .bind(i64::from(purchase.quantity))
        .bind(purchase.unit_price)
        .bind(purchase.purchased_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &purchase.id),
            other => other,
        })?;

        Ok(())
    }

    /// Counts stored purchases.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
