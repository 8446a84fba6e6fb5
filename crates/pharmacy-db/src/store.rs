//! # Pharmacy Store
//!
//! The persistence collaborator the orchestration layer is written against.
//!
//! ```text
//! ┌──────────────────────┐        ┌────────────────────────────┐
//! │ Pharmacy<S>          │  S:    │ Database (SQLite)          │
//! │  add_drug            │───────►│ PharmacyStore              │
//! │  record_purchase ... │        ├────────────────────────────┤
//! └──────────────────────┘        │ test stores (Vec-backed)   │
//!                                 └────────────────────────────┘
//! ```
//!
//! Every method takes or returns whole aggregates. The store never decides
//! anything: stock checks and supplier links are resolved before a save.

use async_trait::async_trait;
use tracing::debug;

use crate::error::DbResult;
use crate::pool::Database;
use pharmacy_core::{Customer, Drug, Purchase, Supplier};

/// Loads and saves the pharmacy's entities.
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    /// Loads all drugs in catalog insertion order.
    async fn load_drugs(&self) -> DbResult<Vec<Drug>>;

    /// Inserts or replaces a drug by key.
    async fn save_drug(&self, drug: &Drug) -> DbResult<()>;

    /// Deletes a drug. Returns whether it existed.
    async fn delete_drug(&self, id: &str) -> DbResult<bool>;

    async fn load_suppliers(&self) -> DbResult<Vec<Supplier>>;

    async fn save_supplier(&self, supplier: &Supplier) -> DbResult<()>;

    async fn load_customers(&self) -> DbResult<Vec<Customer>>;

    async fn save_customer(&self, customer: &Customer) -> DbResult<()>;

    /// Loads the purchase history, oldest first.
    async fn load_purchases(&self) -> DbResult<Vec<Purchase>>;

    /// Appends a purchase. Purchases are never rewritten.
    async fn save_purchase(&self, purchase: &Purchase) -> DbResult<()>;
}

#[async_trait]
impl PharmacyStore for Database {
    async fn load_drugs(&self) -> DbResult<Vec<Drug>> {
        self.drugs().load_all().await
    }

    async fn save_drug(&self, drug: &Drug) -> DbResult<()> {
        self.drugs().upsert(drug).await
    }

    async fn delete_drug(&self, id: &str) -> DbResult<bool> {
        let deleted = self.drugs().delete(id).await?;
        debug!(id = %id, deleted, "Drug delete finished");
        Ok(deleted)
    }

    async fn load_suppliers(&self) -> DbResult<Vec<Supplier>> {
        self.suppliers().load_all().await
    }

    async fn save_supplier(&self, supplier: &Supplier) -> DbResult<()> {
        self.suppliers().upsert(supplier).await
    }

    async fn load_customers(&self) -> DbResult<Vec<Customer>> {
        self.customers().load_all().await
    }

    async fn save_customer(&self, customer: &Customer) -> DbResult<()> {
        self.customers().upsert(customer).await
    }

    async fn load_purchases(&self) -> DbResult<Vec<Purchase>> {
        self.purchases().load_all().await
    }

    async fn save_purchase(&self, purchase: &Purchase) -> DbResult<()> {
        self.purchases().insert(purchase).await
    }
}
