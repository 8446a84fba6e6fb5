//! # Customer Repository
//!
//! Database operations for customers and their purchase references.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{group_links, LinkRow};
use pharmacy_core::Customer;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    contact_info: String,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Loads every customer with purchase ids, oldest purchase first.
    pub async fn load_all(&self) -> DbResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, contact_info FROM customers ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query_as::<_, LinkRow>(
            "SELECT customer_id AS owner_id, purchase_id AS value FROM customer_purchases \
             ORDER BY customer_id, position",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut purchases = group_links(links);

        let customers: Vec<Customer> = rows
            .into_iter()
            .map(|row| {
                let mut customer = Customer::new(row.id, row.name, row.contact_info);
                customer.purchase_ids = purchases.remove(&customer.id).unwrap_or_default();
                customer
            })
            .collect();

        debug!(count = customers.len(), "Loaded customers");
        Ok(customers)
    }

    /// Inserts or replaces a customer and its purchase references.
    pub async fn upsert(&self, customer: &Customer) -> DbResult<()> {
        debug!(
            id = %customer.id,
            purchases = customer.purchase_ids.len(),
            "Upserting customer"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, contact_info, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                contact_info = excluded.contact_info,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.contact_info)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM customer_purchases WHERE customer_id = ?1")
            .bind(&customer.id)
            .execute(&mut *tx)
            .await?;

        for (position, purchase_id) in customer.purchase_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO customer_purchases (customer_id, purchase_id, position) \
                 VALUES (?1, ?2, ?3)",
            )
            .bind(&customer.id)
            .bind(purchase_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Counts stored customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use pharmacy_core::Customer;

    #[tokio::test]
    async fn test_customer_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut customer = Customer::new("C1", "Ama Mensah", "ama@example.com");
        customer.add_purchase("P1");
        customer.add_purchase("P2");

        db.customers().upsert(&customer).await.unwrap();
        db.customers()
            .upsert(&Customer::new("C2", "Kofi Boateng", ""))
            .await
            .unwrap();

        let loaded = db.customers().load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], customer);
        assert!(loaded[1].purchase_ids.is_empty());
        assert_eq!(db.customers().count().await.unwrap(), 2);
    }
}
