//! # Domain Types
//!
//! Core domain types used throughout the pharmacy catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Drug       │   │    Supplier     │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (key)       │   │  id (key)       │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  drug_id        │       │
//! │  │  stock, price   │   │  contact_info   │   │  customer_id    │       │
//! │  │  suppliers ─────┼──►│  supplied_drug_ │   │  quantity       │       │
//! │  │  (SupplierRef)  │◄──┼─ ids (keys)     │   │  unit_price     │       │
//! │  │  purchase_ids   │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                        ┌─────────────────┐                              │
//! │                        │    Customer     │                              │
//! │                        │  id, name       │                              │
//! │                        │  purchase_ids   │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Non-Owning References
//! No entity embeds another. A drug holds [`SupplierRef`]s (supplier key plus
//! a name snapshot for searching), a supplier holds drug keys, and purchases
//! hold both keys. Everything is resolved by key lookup, so there are no
//! ownership cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Supplier Reference
// =============================================================================

/// A drug's link to one of its suppliers.
///
/// The name is a snapshot taken when the link was made. Supplier search
/// matches against it without resolving the supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    /// Supplier identity key.
    pub supplier_id: String,

    /// Supplier name at time of linking.
    pub name: String,
}

impl SupplierRef {
    pub fn new(supplier_id: impl Into<String>, name: impl Into<String>) -> Self {
        SupplierRef {
            supplier_id: supplier_id.into(),
            name: name.into(),
        }
    }
}

impl From<&Supplier> for SupplierRef {
    fn from(supplier: &Supplier) -> Self {
        SupplierRef::new(supplier.id.clone(), supplier.name.clone())
    }
}

// =============================================================================
// Drug
// =============================================================================

/// A drug inventory record.
///
/// ## Identity
/// `id` is caller-assigned and never regenerated. Within one
/// [`Catalog`](crate::Catalog) no two drugs share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    /// Identity key (e.g., "D1", "AMX-500").
    pub id: String,

    /// Display name.
    pub name: String,

    /// Units in inventory.
    pub stock: u32,

    /// Unit price.
    pub price: f64,

    /// Quantity requested in a transient purchase context. Defaults to 0.
    #[serde(default)]
    pub quantity: u32,

    /// Suppliers of this drug (non-owning).
    #[serde(default)]
    pub suppliers: Vec<SupplierRef>,

    /// Purchases of this drug, oldest first (append-only).
    #[serde(default)]
    pub purchase_ids: Vec<String>,
}

impl Drug {
    /// Creates a drug with no suppliers, no purchase history and quantity 0.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stock: u32, price: f64) -> Self {
        Drug {
            id: id.into(),
            name: name.into(),
            stock,
            price,
            quantity: 0,
            suppliers: Vec::new(),
            purchase_ids: Vec::new(),
        }
    }

    /// Sets the requested quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Links a supplier. Returns `false` if the supplier was already linked.
    pub fn add_supplier(&mut self, supplier: SupplierRef) -> bool {
        if self.has_supplier(&supplier.supplier_id) {
            return false;
        }
        self.suppliers.push(supplier);
        true
    }

    /// Unlinks a supplier. Returns whether a link was removed.
    pub fn remove_supplier(&mut self, supplier_id: &str) -> bool {
        let before = self.suppliers.len();
        self.suppliers.retain(|s| s.supplier_id != supplier_id);
        self.suppliers.len() != before
    }

    /// Checks whether the supplier is linked.
    pub fn has_supplier(&self, supplier_id: &str) -> bool {
        self.suppliers.iter().any(|s| s.supplier_id == supplier_id)
    }

    /// Appends a purchase reference.
    pub fn add_purchase(&mut self, purchase_id: impl Into<String>) {
        self.purchase_ids.push(purchase_id.into());
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_dispense(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier of one or more drugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_info: String,
    /// Keys of the drugs this supplier provides.
    #[serde(default)]
    pub supplied_drug_ids: Vec<String>,
}

impl Supplier {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        Supplier {
            id: id.into(),
            name: name.into(),
            contact_info: contact_info.into(),
            supplied_drug_ids: Vec::new(),
        }
    }

    /// Records that this supplier provides a drug. Returns `false` on duplicates.
    pub fn add_supplied_drug(&mut self, drug_id: impl Into<String>) -> bool {
        let drug_id = drug_id.into();
        if self.supplies(&drug_id) {
            return false;
        }
        self.supplied_drug_ids.push(drug_id);
        true
    }

    /// Removes a supplied drug. Returns whether it was present.
    pub fn remove_supplied_drug(&mut self, drug_id: &str) -> bool {
        let before = self.supplied_drug_ids.len();
        self.supplied_drug_ids.retain(|id| id != drug_id);
        self.supplied_drug_ids.len() != before
    }

    pub fn supplies(&self, drug_id: &str) -> bool {
        self.supplied_drug_ids.iter().any(|id| id == drug_id)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub contact_info: String,
    /// Purchases made by this customer, oldest first.
    #[serde(default)]
    pub purchase_ids: Vec<String>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        Customer {
            id: id.into(),
            name: name.into(),
            contact_info: contact_info.into(),
            purchase_ids: Vec::new(),
        }
    }

    pub fn add_purchase(&mut self, purchase_id: impl Into<String>) {
        self.purchase_ids.push(purchase_id.into());
    }

    /// Removes a purchase reference. Returns whether it was present.
    pub fn remove_purchase(&mut self, purchase_id: &str) -> bool {
        let before = self.purchase_ids.len();
        self.purchase_ids.retain(|id| id != purchase_id);
        self.purchase_ids.len() != before
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A single purchase transaction.
///
/// Uses the snapshot pattern: `unit_price` is frozen at time of purchase, so
/// later price changes on the drug do not rewrite revenue history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub drug_id: String,
    pub customer_id: String,
    pub quantity: u32,
    /// Unit price at time of purchase (frozen).
    pub unit_price: f64,
    pub purchased_at: DateTime<Utc>,
}

impl Purchase {
    /// Creates a purchase with a fresh UUID, timestamped now.
    pub fn new(drug: &Drug, customer_id: impl Into<String>, quantity: u32) -> Self {
        Purchase {
            id: Uuid::new_v4().to_string(),
            drug_id: drug.id.clone(),
            customer_id: customer_id.into(),
            quantity,
            unit_price: drug.price,
            purchased_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drug_defaults() {
        let drug = Drug::new("D1", "Amox", 10, 5.0);
        assert_eq!(drug.quantity, 0);
        assert!(drug.suppliers.is_empty());
        assert!(drug.purchase_ids.is_empty());

        let drug = drug.with_quantity(2);
        assert_eq!(drug.quantity, 2);
    }

    #[test]
    fn test_drug_supplier_links_are_deduplicated() {
        let mut drug = Drug::new("D1", "Amox", 10, 5.0);
        assert!(drug.add_supplier(SupplierRef::new("S1", "MedSupply")));
        assert!(!drug.add_supplier(SupplierRef::new("S1", "MedSupply Ltd")));
        assert_eq!(drug.suppliers.len(), 1);

        assert!(drug.remove_supplier("S1"));
        assert!(!drug.remove_supplier("S1"));
        assert!(!drug.has_supplier("S1"));
    }

    #[test]
    fn test_supplier_supplied_drugs() {
        let mut supplier = Supplier::new("S1", "MedSupply", "med@example.com");
        assert!(supplier.add_supplied_drug("D1"));
        assert!(!supplier.add_supplied_drug("D1"));
        assert!(supplier.supplies("D1"));

        let link = SupplierRef::from(&supplier);
        assert_eq!(link.supplier_id, "S1");
        assert_eq!(link.name, "MedSupply");

        assert!(supplier.remove_supplied_drug("D1"));
        assert!(!supplier.supplies("D1"));
    }

    #[test]
    fn test_purchase_snapshots_price() {
        let mut drug = Drug::new("D2", "Panadol", 3, 2.5);
        let purchase = Purchase::new(&drug, "C1", 2);
        drug.price = 10.0;

        assert_eq!(purchase.unit_price, 2.5);
        assert!((purchase.total_cost() - 5.0).abs() < f64::EPSILON);
        assert!(drug.can_dispense(3));
        assert!(!drug.can_dispense(4));
    }

    #[test]
    fn test_customer_purchase_history() {
        let mut customer = Customer::new("C1", "Ama", "ama@example.com");
        customer.add_purchase("P1");
        customer.add_purchase("P2");
        assert_eq!(customer.purchase_ids, vec!["P1", "P2"]);
        assert!(customer.remove_purchase("P1"));
        assert!(!customer.remove_purchase("P1"));
    }

    #[test]
    fn test_drug_deserializes_without_optional_fields() {
        let json = r#"{"id":"D1","name":"Amox","stock":10,"price":5.0}"#;
        let drug: Drug = serde_json::from_str(json).unwrap();
        assert_eq!(drug, Drug::new("D1", "Amox", 10, 5.0));
    }
}
