//! # Pharmacy
//!
//! The orchestration object: an in-memory catalog plus supplier, customer
//! and purchase bookkeeping, written through to a [`PharmacyStore`].
//!
//! ## Write-Through Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_purchase("C1", "D1", 2)                       │
//! │                                                                         │
//! │  1. validate quantity           ── ValidationError                      │
//! │  2. resolve customer, drug      ── CustomerNotFound / DrugNotFound      │
//! │  3. check stock                 ── InsufficientStock                    │
//! │  4. build updated copies        (drug.stock -= 2, purchase ids)         │
//! │  5. persist purchase, drug, customer                                    │
//! │  6. swap copies into memory     (only after every save succeeded)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation follows the same shape: work on copies, save, then swap.
//! A failed save leaves in-memory state untouched. Saves are not grouped in
//! one transaction, so a failure part way through can leave the store ahead
//! of memory; reloading resynchronizes.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{LookupMode, PharmacyConfig};
use crate::error::SystemResult;
use crate::report::{self, InventoryReport};
use pharmacy_core::lookup::linear_search;
use pharmacy_core::ordering::SortKey;
use pharmacy_core::validation::{
    validate_customer_id, validate_drug, validate_drug_id, validate_name, validate_price,
    validate_price_range, validate_quantity, validate_search_query, validate_supplier_id,
};
use pharmacy_core::{Catalog, CoreError, Customer, Drug, Purchase, Supplier, SupplierRef};
use pharmacy_db::PharmacyStore;

// =============================================================================
// Drug Update
// =============================================================================

/// Field changes for [`Pharmacy::update_drug`]. `None` leaves a field alone.
///
/// The identity key is not updatable: a different key is a different drug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrugUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
}

impl DrugUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}

// =============================================================================
// Pharmacy
// =============================================================================

/// In-memory pharmacy state backed by a store.
#[derive(Debug)]
pub struct Pharmacy<S: PharmacyStore> {
    store: S,
    config: PharmacyConfig,
    catalog: Catalog,
    suppliers: Vec<Supplier>,
    customers: Vec<Customer>,
    purchases: Vec<Purchase>,
}

impl<S: PharmacyStore> Pharmacy<S> {
    /// Loads every entity from `store`.
    ///
    /// Stored drugs that share a key collapse to the last one loaded.
    pub async fn load(store: S, config: PharmacyConfig) -> SystemResult<Self> {
        let drugs = store.load_drugs().await?;
        let loaded_drugs = drugs.len();
        let catalog = Catalog::from_drugs(drugs);
        if catalog.count() != loaded_drugs {
            warn!(
                loaded = loaded_drugs,
                kept = catalog.count(),
                "Duplicate drug keys collapsed on load"
            );
        }

        let suppliers = store.load_suppliers().await?;
        let customers = store.load_customers().await?;
        let purchases = store.load_purchases().await?;

        info!(
            drugs = catalog.count(),
            suppliers = suppliers.len(),
            customers = customers.len(),
            purchases = purchases.len(),
            lookup = %config.lookup,
            "Pharmacy loaded"
        );

        Ok(Pharmacy {
            store,
            config,
            catalog,
            suppliers,
            customers,
            purchases,
        })
    }

    pub fn config(&self) -> &PharmacyConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read access to the drug catalog in its current order.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // =========================================================================
    // Drugs
    // =========================================================================

    /// Adds a drug, replacing any drug with the same key in place.
    ///
    /// Re-adding a known key replaces name, stock, price and quantity only.
    /// Its supplier links and purchase ids are carried over from the stored
    /// drug; they change through [`Pharmacy::link_supplier`] and
    /// [`Pharmacy::record_purchase`].
    ///
    /// ## Returns
    /// The replaced drug, if there was one.
    pub async fn add_drug(&mut self, mut drug: Drug) -> SystemResult<Option<Drug>> {
        debug!(id = %drug.id, "Adding drug");
        validate_drug(&drug)?;

        if let Some(stored) = self.catalog.get(&drug.id) {
            drug.suppliers = stored.suppliers.clone();
            drug.purchase_ids = stored.purchase_ids.clone();
        }

        self.store.save_drug(&drug).await?;
        let replaced = self.catalog.upsert(drug);

        debug!(replaced = replaced.is_some(), "Drug saved");
        Ok(replaced)
    }

    /// Removes a drug and detaches it from every supplier that listed it.
    ///
    /// Purchase history is kept. Returns `false` for unknown keys.
    pub async fn remove_drug(&mut self, id: &str) -> SystemResult<bool> {
        if !self.catalog.contains(id) {
            debug!(id = %id, "Drug not in catalog");
            return Ok(false);
        }

        let mut touched = Vec::new();
        for (index, supplier) in self.suppliers.iter().enumerate() {
            if supplier.supplies(id) {
                let mut updated = supplier.clone();
                updated.remove_supplied_drug(id);
                self.store.save_supplier(&updated).await?;
                touched.push((index, updated));
            }
        }

        self.store.delete_drug(id).await?;

        for (index, updated) in touched {
            self.suppliers[index] = updated;
        }
        let removed = self.catalog.remove(id);

        info!(id = %id, removed, "Drug removed");
        Ok(removed)
    }

    /// Finds a drug by key using the configured [`LookupMode`].
    ///
    /// Binary lookup halves the catalog's key index, so the catalog's own
    /// order doesn't matter and nothing is sorted per call.
    pub fn find_drug(&self, id: &str) -> Option<Drug> {
        match self.config.lookup {
            LookupMode::Linear => linear_search(self.catalog.as_slice(), id).cloned(),
            LookupMode::Binary => self.catalog.get_binary(id).cloned(),
        }
    }

    /// Case-insensitive name substring search. The query is trimmed.
    pub fn search_by_name(&self, query: &str) -> SystemResult<Vec<Drug>> {
        let query = validate_search_query(query)?;
        Ok(cloned(self.catalog.search_by_name(&query)))
    }

    /// Drugs priced within `[min_price, max_price]`. `min > max` matches nothing.
    pub fn search_by_price_range(&self, min_price: f64, max_price: f64) -> SystemResult<Vec<Drug>> {
        validate_price_range(min_price, max_price)?;
        Ok(cloned(self.catalog.search_by_price_range(min_price, max_price)))
    }

    /// Drugs with a linked supplier whose name contains `supplier_name`.
    pub fn search_by_supplier(&self, supplier_name: &str) -> SystemResult<Vec<Drug>> {
        let query = validate_search_query(supplier_name)?;
        Ok(cloned(self.catalog.search_by_supplier(&query)))
    }

    /// Reorders the in-memory catalog. Storage order is unaffected.
    pub fn sort_drugs(&mut self, key: SortKey) {
        debug!(key = %key, count = self.catalog.count(), "Sorting catalog");
        self.catalog.sort_by(key);
    }

    /// Sorts by the configured default key.
    pub fn sort_default(&mut self) {
        self.sort_drugs(self.config.default_sort);
    }

    /// Changes name, price or stock of an existing drug.
    ///
    /// ## Returns
    /// The drug as stored after the update.
    pub async fn update_drug(&mut self, id: &str, update: DrugUpdate) -> SystemResult<Drug> {
        let current = self
            .catalog
            .get(id)
            .ok_or_else(|| CoreError::DrugNotFound(id.to_string()))?;

        let mut updated = current.clone();
        if let Some(name) = update.name {
            validate_name(&name)?;
            updated.name = name;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
            updated.price = price;
        }
        if let Some(stock) = update.stock {
            updated.stock = stock;
        }

        self.store.save_drug(&updated).await?;
        self.catalog.upsert(updated.clone());

        debug!(id = %id, stock = updated.stock, price = updated.price, "Drug updated");
        Ok(updated)
    }

    /// Snapshot of every drug in current catalog order.
    pub fn drugs(&self) -> Vec<Drug> {
        self.catalog.all()
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Adds or replaces a supplier by key.
    ///
    /// A known supplier keeps its stored drug list, so links stay two-sided.
    /// A rename is propagated to the supplier snapshot held by each linked
    /// drug.
    pub async fn add_supplier(&mut self, mut supplier: Supplier) -> SystemResult<()> {
        validate_supplier_id(&supplier.id)?;
        validate_name(&supplier.name)?;

        if let Some(stored) = self.supplier(&supplier.id) {
            supplier.supplied_drug_ids = stored.supplied_drug_ids.clone();
        }

        let reference = SupplierRef::from(&supplier);
        let mut renamed = Vec::new();
        for drug in self.catalog.iter() {
            let stale = drug
                .suppliers
                .iter()
                .any(|s| s.supplier_id == reference.supplier_id && s.name != reference.name);
            if stale {
                let mut updated = drug.clone();
                for link in updated.suppliers.iter_mut() {
                    if link.supplier_id == reference.supplier_id {
                        link.name = reference.name.clone();
                    }
                }
                renamed.push(updated);
            }
        }

        self.store.save_supplier(&supplier).await?;
        for drug in &renamed {
            self.store.save_drug(drug).await?;
        }

        debug!(id = %supplier.id, renamed_links = renamed.len(), "Supplier saved");
        for drug in renamed {
            self.catalog.upsert(drug);
        }
        upsert_by_key(&mut self.suppliers, supplier, |s| &s.id);
        Ok(())
    }

    /// Links a supplier to a drug on both sides.
    ///
    /// ## Returns
    /// `false` if they were already linked.
    pub async fn link_supplier(&mut self, supplier_id: &str, drug_id: &str) -> SystemResult<bool> {
        let (index, supplier) = self.supplier_entry(supplier_id)?;
        let drug = self
            .catalog
            .get(drug_id)
            .ok_or_else(|| CoreError::DrugNotFound(drug_id.to_string()))?;

        let mut supplier = supplier.clone();
        let mut drug = drug.clone();
        let drug_changed = drug.add_supplier(SupplierRef::from(&supplier));
        let supplier_changed = supplier.add_supplied_drug(drug_id);
        if !drug_changed && !supplier_changed {
            return Ok(false);
        }

        self.store.save_drug(&drug).await?;
        self.store.save_supplier(&supplier).await?;
        self.catalog.upsert(drug);
        self.suppliers[index] = supplier;

        info!(supplier_id = %supplier_id, drug_id = %drug_id, "Supplier linked");
        Ok(true)
    }

    /// Removes the link between a supplier and a drug on both sides.
    ///
    /// ## Returns
    /// `false` if they were not linked.
    pub async fn unlink_supplier(&mut self, supplier_id: &str, drug_id: &str) -> SystemResult<bool> {
        let (index, supplier) = self.supplier_entry(supplier_id)?;
        let drug = self
            .catalog
            .get(drug_id)
            .ok_or_else(|| CoreError::DrugNotFound(drug_id.to_string()))?;

        let mut supplier = supplier.clone();
        let mut drug = drug.clone();
        let drug_changed = drug.remove_supplier(supplier_id);
        let supplier_changed = supplier.remove_supplied_drug(drug_id);
        if !drug_changed && !supplier_changed {
            return Ok(false);
        }

        self.store.save_drug(&drug).await?;
        self.store.save_supplier(&supplier).await?;
        self.catalog.upsert(drug);
        self.suppliers[index] = supplier;

        info!(supplier_id = %supplier_id, drug_id = %drug_id, "Supplier unlinked");
        Ok(true)
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    fn supplier_entry(&self, id: &str) -> SystemResult<(usize, &Supplier)> {
        self.suppliers
            .iter()
            .enumerate()
            .find(|(_, s)| s.id == id)
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()).into())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Adds or replaces a customer by key. A known customer keeps its
    /// purchase ids.
    pub async fn add_customer(&mut self, mut customer: Customer) -> SystemResult<()> {
        debug!(id = %customer.id, "Adding customer");
        validate_customer_id(&customer.id)?;
        validate_name(&customer.name)?;

        if let Some(stored) = self.customer(&customer.id) {
            customer.purchase_ids = stored.purchase_ids.clone();
        }

        self.store.save_customer(&customer).await?;
        upsert_by_key(&mut self.customers, customer, |c| &c.id);
        Ok(())
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Sells `quantity` units of a drug to a customer.
    ///
    /// The purchase keeps the drug's current price. Stock is decremented and
    /// the purchase id is appended to both the drug and the customer.
    ///
    /// ## Errors
    /// * `ValidationError` - quantity is 0 or above the per-purchase cap
    /// * `CustomerNotFound` / `DrugNotFound` - unknown key
    /// * `InsufficientStock` - not enough units; nothing changes
    pub async fn record_purchase(
        &mut self,
        customer_id: &str,
        drug_id: &str,
        quantity: u32,
    ) -> SystemResult<Purchase> {
        validate_quantity(quantity)?;
        validate_drug_id(drug_id)?;

        let customer_index = self
            .customers
            .iter()
            .position(|c| c.id == customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;
        let drug = self
            .catalog
            .get(drug_id)
            .ok_or_else(|| CoreError::DrugNotFound(drug_id.to_string()))?;

        if !drug.can_dispense(quantity) {
            warn!(
                drug_id = %drug_id,
                available = drug.stock,
                requested = quantity,
                "Insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                drug_id: drug_id.to_string(),
                available: drug.stock,
                requested: quantity,
            }
            .into());
        }

        let purchase = Purchase::new(drug, customer_id, quantity);

        let mut drug = drug.clone();
        drug.stock -= quantity;
        drug.add_purchase(purchase.id.clone());

        let mut customer = self.customers[customer_index].clone();
        customer.add_purchase(purchase.id.clone());

        self.store.save_purchase(&purchase).await?;
        self.store.save_drug(&drug).await?;
        self.store.save_customer(&customer).await?;

        info!(
            purchase_id = %purchase.id,
            customer_id = %customer_id,
            drug_id = %drug_id,
            remaining = drug.stock,
            total = purchase.total_cost(),
            "Purchase recorded"
        );

        self.catalog.upsert(drug);
        self.customers[customer_index] = customer;
        self.purchases.push(purchase.clone());
        Ok(purchase)
    }

    /// A customer's purchases, oldest first.
    pub fn purchase_history(&self, customer_id: &str) -> SystemResult<Vec<Purchase>> {
        if self.customer(customer_id).is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        Ok(self
            .purchases
            .iter()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect())
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub fn total_revenue(&self) -> f64 {
        report::total_revenue(&self.purchases)
    }

    pub fn customer_total_spent(&self, customer_id: &str) -> f64 {
        report::customer_total_spent(&self.purchases, customer_id)
    }

    /// Drug key → stock, ordered by key.
    pub fn inventory_status(&self) -> BTreeMap<String, u32> {
        report::inventory_status(self.catalog.as_slice())
    }

    /// Drugs with stock strictly below `threshold`.
    pub fn low_stock(&self, threshold: u32) -> Vec<Drug> {
        cloned(report::low_stock(self.catalog.as_slice(), threshold))
    }

    /// Low-stock drugs using the configured threshold.
    pub fn low_stock_drugs(&self) -> Vec<Drug> {
        self.low_stock(self.config.low_stock_threshold)
    }

    pub fn inventory_report(&self) -> InventoryReport {
        InventoryReport::build(
            self.catalog.as_slice(),
            &self.purchases,
            self.config.low_stock_threshold,
        )
    }
}

fn cloned(drugs: Vec<&Drug>) -> Vec<Drug> {
    drugs.into_iter().cloned().collect()
}

/// Replaces the item with the same key in place, or appends it.
fn upsert_by_key<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SystemError;
    use async_trait::async_trait;
    use pharmacy_core::ValidationError;
    use pharmacy_db::{DbError, DbResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Vec-backed store. `fail_saves` makes every save return an error.
    #[derive(Debug, Default)]
    struct MemoryStore {
        drugs: Mutex<Vec<Drug>>,
        suppliers: Mutex<Vec<Supplier>>,
        customers: Mutex<Vec<Customer>>,
        purchases: Mutex<Vec<Purchase>>,
        fail_saves: AtomicBool,
    }

    impl MemoryStore {
        fn check(&self) -> DbResult<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(DbError::ConnectionFailed("store offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PharmacyStore for MemoryStore {
        async fn load_drugs(&self) -> DbResult<Vec<Drug>> {
            Ok(self.drugs.lock().unwrap().clone())
        }

        async fn save_drug(&self, drug: &Drug) -> DbResult<()> {
            self.check()?;
            upsert_by_key(&mut *self.drugs.lock().unwrap(), drug.clone(), |d| &d.id);
            Ok(())
        }

        async fn delete_drug(&self, id: &str) -> DbResult<bool> {
            self.check()?;
            let mut drugs = self.drugs.lock().unwrap();
            let before = drugs.len();
            drugs.retain(|d| d.id != id);
            Ok(drugs.len() != before)
        }

        async fn load_suppliers(&self) -> DbResult<Vec<Supplier>> {
            Ok(self.suppliers.lock().unwrap().clone())
        }

        async fn save_supplier(&self, supplier: &Supplier) -> DbResult<()> {
            self.check()?;
            upsert_by_key(&mut *self.suppliers.lock().unwrap(), supplier.clone(), |s| &s.id);
            Ok(())
        }

        async fn load_customers(&self) -> DbResult<Vec<Customer>> {
            Ok(self.customers.lock().unwrap().clone())
        }

        async fn save_customer(&self, customer: &Customer) -> DbResult<()> {
            self.check()?;
            upsert_by_key(&mut *self.customers.lock().unwrap(), customer.clone(), |c| &c.id);
            Ok(())
        }

        async fn load_purchases(&self) -> DbResult<Vec<Purchase>> {
            Ok(self.purchases.lock().unwrap().clone())
        }

        async fn save_purchase(&self, purchase: &Purchase) -> DbResult<()> {
            self.check()?;
            self.purchases.lock().unwrap().push(purchase.clone());
            Ok(())
        }
    }

    async fn pharmacy() -> Pharmacy<MemoryStore> {
        Pharmacy::load(MemoryStore::default(), PharmacyConfig::default())
            .await
            .unwrap()
    }

    async fn stocked_pharmacy() -> Pharmacy<MemoryStore> {
        let mut pharmacy = pharmacy().await;
        pharmacy.add_drug(Drug::new("D1", "Amox", 10, 5.0)).await.unwrap();
        pharmacy.add_drug(Drug::new("D2", "Panadol", 3, 2.5)).await.unwrap();
        pharmacy
            .add_customer(Customer::new("C1", "Ama Mensah", "ama@example.com"))
            .await
            .unwrap();
        pharmacy
            .add_supplier(Supplier::new("S1", "Ernest Chemists", ""))
            .await
            .unwrap();
        pharmacy
    }

    fn ids(drugs: &[Drug]) -> Vec<&str> {
        drugs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_reads_store() {
        let store = MemoryStore::default();
        store.drugs.lock().unwrap().push(Drug::new("D1", "Amox", 10, 5.0));
        store.drugs.lock().unwrap().push(Drug::new("D1", "Amoxicillin", 10, 5.0));
        store.customers.lock().unwrap().push(Customer::new("C1", "Ama", ""));

        let pharmacy = Pharmacy::load(store, PharmacyConfig::default()).await.unwrap();

        assert_eq!(pharmacy.drugs().len(), 1);
        assert_eq!(pharmacy.drugs()[0].name, "Amoxicillin");
        assert_eq!(pharmacy.customers().len(), 1);
    }

    #[tokio::test]
    async fn test_add_drug_persists_and_replaces() {
        let mut pharmacy = stocked_pharmacy().await;

        let replaced = pharmacy
            .add_drug(Drug::new("D1", "Amoxicillin", 10, 5.0))
            .await
            .unwrap();

        assert_eq!(replaced.map(|d| d.name), Some("Amox".to_string()));
        assert_eq!(ids(&pharmacy.drugs()), vec!["D1", "D2"]);
        assert_eq!(pharmacy.store().drugs.lock().unwrap()[0].name, "Amoxicillin");
    }

    #[tokio::test]
    async fn test_add_drug_rejects_invalid() {
        let mut pharmacy = pharmacy().await;

        let err = pharmacy
            .add_drug(Drug::new("D1", "Amox", 1, f64::NAN))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SystemError::Core(CoreError::Validation(ValidationError::MustBeFinite { .. }))
        ));

        let err = pharmacy.add_drug(Drug::new("", "Amox", 1, 1.0)).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(pharmacy.drugs().is_empty());
        assert!(pharmacy.store().drugs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_memory_unchanged() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.store().fail_saves.store(true, Ordering::SeqCst);

        let err = pharmacy
            .add_drug(Drug::new("D3", "Ibuprofen", 4, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SystemError::Store(_)));
        assert!(pharmacy.find_drug("D3").is_none());

        let err = pharmacy.record_purchase("C1", "D1", 2).await.unwrap_err();
        assert!(matches!(err, SystemError::Store(_)));
        assert_eq!(pharmacy.find_drug("D1").unwrap().stock, 10);
        assert!(pharmacy.purchases().is_empty());
    }

    #[tokio::test]
    async fn test_remove_drug() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.link_supplier("S1", "D2").await.unwrap();

        assert!(!pharmacy.remove_drug("D3").await.unwrap());
        assert!(pharmacy.remove_drug("D2").await.unwrap());

        assert_eq!(ids(&pharmacy.drugs()), vec!["D1"]);
        assert!(!pharmacy.supplier("S1").unwrap().supplies("D2"));
        assert_eq!(pharmacy.store().drugs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_drug_modes_agree_on_unsorted_catalog() {
        let mut pharmacy = pharmacy().await;
        for id in ["K-200", "A-100", "P-050", "C-300"] {
            pharmacy.add_drug(Drug::new(id, id, 1, 1.0)).await.unwrap();
        }
        let config = PharmacyConfig {
            lookup: LookupMode::Linear,
            ..PharmacyConfig::default()
        };
        let mut linear = Pharmacy::load(MemoryStore::default(), config).await.unwrap();
        for drug in pharmacy.drugs() {
            linear.add_drug(drug).await.unwrap();
        }

        for id in ["K-200", "A-100", "P-050", "C-300", "Z-999"] {
            assert_eq!(pharmacy.find_drug(id), linear.find_drug(id));
        }
        assert_eq!(pharmacy.find_drug("P-050").unwrap().id, "P-050");
        // Lookup never reorders the catalog.
        assert_eq!(ids(&pharmacy.drugs()), vec!["K-200", "A-100", "P-050", "C-300"]);
    }

    #[tokio::test]
    async fn test_binary_lookup_after_reorder_and_removal() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.add_drug(Drug::new("D0", "Zinc", 8, 0.5)).await.unwrap();

        pharmacy.sort_drugs(SortKey::Price);
        assert_eq!(ids(&pharmacy.drugs()), vec!["D0", "D2", "D1"]);
        assert_eq!(pharmacy.find_drug("D1").unwrap().name, "Amox");

        pharmacy.remove_drug("D0").await.unwrap();
        assert!(pharmacy.find_drug("D0").is_none());
        assert_eq!(pharmacy.find_drug("D2").unwrap().stock, 3);
        assert_eq!(ids(&pharmacy.drugs()), vec!["D2", "D1"]);
    }

    #[tokio::test]
    async fn test_searches() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.link_supplier("S1", "D2").await.unwrap();

        assert_eq!(ids(&pharmacy.search_by_name("  pana ").unwrap()), vec!["D2"]);
        assert_eq!(ids(&pharmacy.search_by_price_range(1.0, 3.0).unwrap()), vec!["D2"]);
        assert!(pharmacy.search_by_price_range(3.0, 1.0).unwrap().is_empty());
        assert!(pharmacy.search_by_price_range(f64::NAN, 1.0).is_err());
        assert_eq!(ids(&pharmacy.search_by_supplier("ernest").unwrap()), vec!["D2"]);
        assert!(pharmacy.search_by_name(&"x".repeat(101)).is_err());
    }

    #[tokio::test]
    async fn test_sort_drugs() {
        let mut pharmacy = stocked_pharmacy().await;

        pharmacy.sort_drugs(SortKey::Price);
        assert_eq!(ids(&pharmacy.drugs()), vec!["D2", "D1"]);

        pharmacy.sort_default();
        assert_eq!(ids(&pharmacy.drugs()), vec!["D1", "D2"]);
    }

    #[tokio::test]
    async fn test_update_drug() {
        let mut pharmacy = stocked_pharmacy().await;

        let updated = pharmacy
            .update_drug("D2", DrugUpdate::default().price(3.0).stock(20))
            .await
            .unwrap();
        assert_eq!(updated.id, "D2");
        assert_eq!(updated.name, "Panadol");
        assert_eq!(updated.price, 3.0);
        assert_eq!(pharmacy.find_drug("D2").unwrap().stock, 20);

        let err = pharmacy
            .update_drug("D9", DrugUpdate::default().stock(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SystemError::Core(CoreError::DrugNotFound(_))));

        assert!(pharmacy
            .update_drug("D2", DrugUpdate::default().name("  "))
            .await
            .is_err());
        assert_eq!(pharmacy.find_drug("D2").unwrap().name, "Panadol");
    }

    #[tokio::test]
    async fn test_link_and_unlink_supplier() {
        let mut pharmacy = stocked_pharmacy().await;

        assert!(pharmacy.link_supplier("S1", "D1").await.unwrap());
        assert!(!pharmacy.link_supplier("S1", "D1").await.unwrap());
        assert!(pharmacy.find_drug("D1").unwrap().has_supplier("S1"));
        assert!(pharmacy.supplier("S1").unwrap().supplies("D1"));
        assert!(pharmacy.store().suppliers.lock().unwrap()[0].supplies("D1"));

        let err = pharmacy.link_supplier("S9", "D1").await.unwrap_err();
        assert!(matches!(err, SystemError::Core(CoreError::SupplierNotFound(_))));
        let err = pharmacy.link_supplier("S1", "D9").await.unwrap_err();
        assert!(matches!(err, SystemError::Core(CoreError::DrugNotFound(_))));

        assert!(pharmacy.unlink_supplier("S1", "D1").await.unwrap());
        assert!(!pharmacy.unlink_supplier("S1", "D1").await.unwrap());
        assert!(!pharmacy.find_drug("D1").unwrap().has_supplier("S1"));
    }

    #[tokio::test]
    async fn test_supplier_rename_updates_drug_snapshots() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.link_supplier("S1", "D1").await.unwrap();

        let mut renamed = pharmacy.supplier("S1").unwrap().clone();
        renamed.name = "Ernest Chemists Ltd".to_string();
        pharmacy.add_supplier(renamed).await.unwrap();

        assert_eq!(pharmacy.suppliers().len(), 1);
        assert_eq!(
            pharmacy.find_drug("D1").unwrap().suppliers[0].name,
            "Ernest Chemists Ltd"
        );
        assert_eq!(ids(&pharmacy.search_by_supplier("ltd").unwrap()), vec!["D1"]);
    }

    #[tokio::test]
    async fn test_readding_drug_keeps_links_and_history() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.link_supplier("S1", "D1").await.unwrap();
        let purchase = pharmacy.record_purchase("C1", "D1", 1).await.unwrap();

        pharmacy
            .add_drug(Drug::new("D1", "Amoxicillin", 9, 5.0))
            .await
            .unwrap();

        let drug = pharmacy.find_drug("D1").unwrap();
        assert_eq!(drug.name, "Amoxicillin");
        assert_eq!(drug.stock, 9);
        assert!(drug.has_supplier("S1"));
        assert_eq!(drug.purchase_ids, vec![purchase.id.clone()]);
        assert!(pharmacy.supplier("S1").unwrap().supplies("D1"));
        assert_eq!(ids(&pharmacy.search_by_supplier("ernest").unwrap()), vec!["D1"]);

        let stored = pharmacy.store().drugs.lock().unwrap()[0].clone();
        assert_eq!(stored.name, "Amoxicillin");
        assert!(stored.has_supplier("S1"));
        assert_eq!(stored.purchase_ids, vec![purchase.id]);
    }

    #[tokio::test]
    async fn test_readding_supplier_keeps_supplied_drugs() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy.link_supplier("S1", "D2").await.unwrap();

        pharmacy
            .add_supplier(Supplier::new("S1", "Ernest Chemists", "orders@ernest.example"))
            .await
            .unwrap();

        let supplier = pharmacy.supplier("S1").unwrap();
        assert_eq!(supplier.contact_info, "orders@ernest.example");
        assert!(supplier.supplies("D2"));
        assert!(pharmacy.find_drug("D2").unwrap().has_supplier("S1"));
        assert!(pharmacy.store().suppliers.lock().unwrap()[0].supplies("D2"));
    }

    #[tokio::test]
    async fn test_readding_customer_keeps_purchases() {
        let mut pharmacy = stocked_pharmacy().await;
        let purchase = pharmacy.record_purchase("C1", "D1", 2).await.unwrap();

        pharmacy
            .add_customer(Customer::new("C1", "Ama Owusu", ""))
            .await
            .unwrap();

        let customer = pharmacy.customer("C1").unwrap();
        assert_eq!(customer.name, "Ama Owusu");
        assert_eq!(customer.purchase_ids, vec![purchase.id]);
    }

    #[tokio::test]
    async fn test_record_purchase() {
        let mut pharmacy = stocked_pharmacy().await;

        let purchase = pharmacy.record_purchase("C1", "D1", 4).await.unwrap();

        assert_eq!(purchase.unit_price, 5.0);
        assert_eq!(purchase.total_cost(), 20.0);
        let drug = pharmacy.find_drug("D1").unwrap();
        assert_eq!(drug.stock, 6);
        assert_eq!(drug.purchase_ids, vec![purchase.id.clone()]);
        assert_eq!(pharmacy.customer("C1").unwrap().purchase_ids, vec![purchase.id.clone()]);
        assert_eq!(pharmacy.store().purchases.lock().unwrap().len(), 1);
        assert_eq!(pharmacy.store().drugs.lock().unwrap()[0].stock, 6);
        assert_eq!(pharmacy.purchase_history("C1").unwrap(), vec![purchase]);
    }

    #[tokio::test]
    async fn test_record_purchase_errors() {
        let mut pharmacy = stocked_pharmacy().await;

        let err = pharmacy.record_purchase("C1", "D2", 4).await.unwrap_err();
        match err {
            SystemError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(pharmacy.find_drug("D2").unwrap().stock, 3);

        assert!(pharmacy.record_purchase("C1", "D2", 0).await.is_err());
        assert!(matches!(
            pharmacy.record_purchase("C9", "D2", 1).await.unwrap_err(),
            SystemError::Core(CoreError::CustomerNotFound(_))
        ));
        assert!(matches!(
            pharmacy.record_purchase("C1", "D9", 1).await.unwrap_err(),
            SystemError::Core(CoreError::DrugNotFound(_))
        ));
        assert!(pharmacy.purchases().is_empty());

        // Selling the last units is allowed.
        pharmacy.record_purchase("C1", "D2", 3).await.unwrap();
        assert_eq!(pharmacy.find_drug("D2").unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_reports() {
        let mut pharmacy = stocked_pharmacy().await;
        pharmacy
            .add_customer(Customer::new("C2", "Kofi Boateng", ""))
            .await
            .unwrap();

        pharmacy.record_purchase("C1", "D1", 2).await.unwrap();
        pharmacy
            .update_drug("D1", DrugUpdate::default().price(6.0))
            .await
            .unwrap();
        pharmacy.record_purchase("C2", "D1", 1).await.unwrap();

        assert_eq!(pharmacy.total_revenue(), 16.0);
        assert_eq!(pharmacy.customer_total_spent("C1"), 10.0);
        assert_eq!(pharmacy.customer_total_spent("C2"), 6.0);

        let status = pharmacy.inventory_status();
        assert_eq!(status["D1"], 7);
        assert_eq!(status["D2"], 3);

        assert_eq!(ids(&pharmacy.low_stock(5)), vec!["D2"]);
        assert_eq!(ids(&pharmacy.low_stock_drugs()), vec!["D1", "D2"]);

        let report = pharmacy.inventory_report();
        assert_eq!(report.purchase_count, 2);
        assert_eq!(report.total_revenue, 16.0);
        assert!(pharmacy.purchase_history("C9").is_err());
    }

    #[tokio::test]
    async fn test_add_customer_replaces_by_key() {
        let mut pharmacy = stocked_pharmacy().await;

        pharmacy
            .add_customer(Customer::new("C1", "Ama Owusu", ""))
            .await
            .unwrap();

        assert_eq!(pharmacy.customers().len(), 1);
        assert_eq!(pharmacy.customer("C1").unwrap().name, "Ama Owusu");
        assert!(pharmacy
            .add_customer(Customer::new("bad id", "X", ""))
            .await
            .is_err());
    }
}
