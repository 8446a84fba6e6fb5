//! # Catalog
//!
//! Keyed, ordered collection of [`Drug`] records.
//!
//! ## Invariants
//! - No two drugs share an `id`
//! - Insertion order is kept until a sort is explicitly requested
//! - `upsert` of an existing key replaces the whole record in its slot
//!
//! ## Upsert Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upsert(Drug { id: "D1", name: "Amoxicillin", .. })                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Scan for slot with id == "D1"                                         │
//! │       │                                                                 │
//! │       ├── found at index i → drugs[i] = new record (full replace)       │
//! │       │                                                                 │
//! │       └── not found        → drugs.push(new record)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Index
//! Alongside the drugs the catalog keeps their slot numbers ordered by key.
//! Appends and removals patch it in place and sorts rebuild it, so
//! [`Catalog::get_binary`] halves an already ordered index and never sorts.
//!
//! ## Snapshots
//! [`Catalog::all`] returns an owned copy. Sorting or editing that copy never
//! touches the catalog, and later catalog writes never show up in it. Sort a
//! snapshot when the catalog order must stay as it is.

use std::cmp::Ordering;

use crate::lookup;
use crate::ordering::{merge_sort, SortAlgorithm, SortKey};
use crate::types::Drug;

/// An in-memory drug catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    drugs: Vec<Drug>,
    /// `(id, slot in drugs)`, ascending by `id`.
    key_index: Vec<(String, usize)>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog by upserting each drug in order.
    ///
    /// Later duplicates replace earlier ones in the earlier slot.
    pub fn from_drugs(drugs: impl IntoIterator<Item = Drug>) -> Self {
        let mut catalog = Catalog::new();
        for drug in drugs {
            catalog.upsert(drug);
        }
        catalog
    }

    /// Where `id` sits in the key index: `Ok(i)` if present, else the
    /// insertion point.
    fn index_position(&self, id: &str) -> Result<usize, usize> {
        self.key_index
            .binary_search_by(|(key, _)| key.as_str().cmp(id))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.index_position(id).ok().map(|i| self.key_index[i].1)
    }

    fn rebuild_key_index(&mut self) {
        let mut index: Vec<(String, usize)> = self
            .drugs
            .iter()
            .enumerate()
            .map(|(slot, drug)| (drug.id.clone(), slot))
            .collect();
        merge_sort(&mut index, |a, b| a.0.cmp(&b.0));
        self.key_index = index;
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Inserts a new drug or fully replaces the drug with the same key.
    ///
    /// A replaced drug keeps its slot. Returns the previous record, if any.
    pub fn upsert(&mut self, drug: Drug) -> Option<Drug> {
        match self.index_position(&drug.id) {
            Ok(i) => {
                let slot = self.key_index[i].1;
                Some(std::mem::replace(&mut self.drugs[slot], drug))
            }
            Err(i) => {
                self.key_index.insert(i, (drug.id.clone(), self.drugs.len()));
                self.drugs.push(drug);
                None
            }
        }
    }

    /// Removes the drug with this key. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.take(id).is_some()
    }

    /// Removes and returns the drug with this key.
    pub fn take(&mut self, id: &str) -> Option<Drug> {
        let i = self.index_position(id).ok()?;
        let (_, slot) = self.key_index.remove(i);
        for entry in self.key_index.iter_mut() {
            if entry.1 > slot {
                entry.1 -= 1;
            }
        }
        Some(self.drugs.remove(slot))
    }

    /// Sets the stock of a drug. Returns `false` if the key is unknown.
    pub fn update_stock(&mut self, id: &str, new_stock: u32) -> bool {
        match self.get_mut(id) {
            Some(drug) => {
                drug.stock = new_stock;
                true
            }
            None => false,
        }
    }

    /// Removes every drug.
    pub fn clear(&mut self) {
        self.drugs.clear();
        self.key_index.clear();
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Returns the drug with this key.
    pub fn get(&self, id: &str) -> Option<&Drug> {
        lookup::linear_search(&self.drugs, id)
    }

    /// Returns the drug with this key by binary search over the key index.
    ///
    /// O(log n) whatever the current catalog order.
    pub fn get_binary(&self, id: &str) -> Option<&Drug> {
        lookup::binary_search_by_key(&self.key_index, id, |(key, _)| key.as_str())
            .map(|&(_, slot)| &self.drugs[slot])
    }

    /// Mutable access for in-place stock and price updates.
    ///
    /// Changing `id` through this reference breaks key uniqueness; use
    /// [`Catalog::take`] and [`Catalog::upsert`] to re-key instead.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Drug> {
        self.drugs.iter_mut().find(|d| d.id == id)
    }

    /// Checks whether a drug with this key exists.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Returns an independent copy of every drug in current order.
    pub fn all(&self) -> Vec<Drug> {
        self.drugs.clone()
    }

    /// Borrows the drugs in current order.
    pub fn as_slice(&self) -> &[Drug] {
        &self.drugs
    }

    /// Iterates over the drugs in current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Drug> {
        self.drugs.iter()
    }

    /// Number of drugs.
    pub fn count(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Reorders the catalog with a caller-supplied comparator.
    pub fn sort_with<F>(&mut self, algorithm: SortAlgorithm, cmp: F)
    where
        F: FnMut(&Drug, &Drug) -> Ordering,
    {
        algorithm.sort(&mut self.drugs, cmp);
        self.rebuild_key_index();
    }

    /// Reorders the catalog by one of the built-in keys.
    pub fn sort_by(&mut self, key: SortKey) {
        key.sort(&mut self.drugs);
        self.rebuild_key_index();
    }

    /// Sorts by name (partition-exchange).
    pub fn sort_by_name(&mut self) {
        self.sort_by(SortKey::Name);
    }

    /// Sorts by identity key (merge sort).
    pub fn sort_by_id(&mut self) {
        self.sort_by(SortKey::Id);
    }

    /// Sorts by price ascending (partition-exchange).
    pub fn sort_by_price(&mut self) {
        self.sort_by(SortKey::Price);
    }

    // -------------------------------------------------------------------------
    // Searching
    // -------------------------------------------------------------------------

    /// Drugs whose name contains `name`, case-insensitive.
    pub fn search_by_name(&self, name: &str) -> Vec<&Drug> {
        lookup::search_by_name(&self.drugs, name)
    }

    /// Drugs priced within `[min_price, max_price]`.
    pub fn search_by_price_range(&self, min_price: f64, max_price: f64) -> Vec<&Drug> {
        lookup::search_by_price_range(&self.drugs, min_price, max_price)
    }

    /// Drugs with a supplier whose name contains `supplier_name`.
    pub fn search_by_supplier(&self, supplier_name: &str) -> Vec<&Drug> {
        lookup::search_by_supplier(&self.drugs, supplier_name)
    }

    /// Drugs matching an arbitrary predicate.
    pub fn filter<P>(&self, predicate: P) -> Vec<&Drug>
    where
        P: FnMut(&Drug) -> bool,
    {
        lookup::filter(&self.drugs, predicate)
    }
}

impl FromIterator<Drug> for Catalog {
    fn from_iter<I: IntoIterator<Item = Drug>>(iter: I) -> Self {
        Catalog::from_drugs(iter)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Drug;
    type IntoIter = std::slice::Iter<'a, Drug>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
