//! # Lookup Engine
//!
//! Exact-key search and predicate filtering over slices.
//!
//! ## Search Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lookup Operations                                │
//! │                                                                         │
//! │  EXACT KEY                                                             │
//! │  ├── linear_search   O(n)      any order                               │
//! │  └── binary_search   O(log n)  REQUIRES ascending order by key         │
//! │                                                                         │
//! │  MULTI-MATCH (stable filter, input order preserved)                    │
//! │  ├── filter               arbitrary predicate                          │
//! │  ├── search_by_name       case-insensitive substring of name           │
//! │  ├── search_by_price_range inclusive [min, max]                        │
//! │  └── search_by_supplier   case-insensitive substring of supplier name  │
//! │                                                                         │
//! │  "No match" is never an error: None or an empty Vec.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Binary Search Precondition
//! The slice must be sorted ascending by key. This is NOT checked: on an
//! unsorted slice the result is unspecified (a miss, or a hit found by
//! luck), but it never panics. Sort first with
//! [`sort_by_id`](crate::ordering::sort_by_id) when in doubt.

use std::cmp::Ordering;

use crate::types::Drug;

// =============================================================================
// Generic Exact Search
// =============================================================================

/// Returns the first element whose extracted key equals `key`.
pub fn linear_search_by_key<'a, T, K, F>(items: &'a [T], key: &K, mut extract: F) -> Option<&'a T>
where
    K: PartialEq + ?Sized,
    F: FnMut(&T) -> &K,
{
    items.iter().find(|&item| extract(item) == key)
}

/// Halve-the-range search over a slice sorted ascending by extracted key.
///
/// Compares the midpoint key against `key` and narrows to the lower or upper
/// half, returning `None` once the range is empty.
pub fn binary_search_by_key<'a, T, K, F>(items: &'a [T], key: &K, mut extract: F) -> Option<&'a T>
where
    K: Ord + ?Sized,
    F: FnMut(&T) -> &K,
{
    // Half-open range [low, high).
    let mut low = 0;
    let mut high = items.len();

    while low < high {
        let mid = low + (high - low) / 2;
        let candidate = &items[mid];

        match extract(candidate).cmp(key) {
            Ordering::Equal => return Some(candidate),
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
        }
    }

    None
}

// =============================================================================
// Drug Exact Search
// =============================================================================

/// Finds a drug by identity key with a linear scan. No ordering required.
pub fn linear_search<'a>(drugs: &'a [Drug], id: &str) -> Option<&'a Drug> {
    linear_search_by_key(drugs, id, |d| d.id.as_str())
}

/// Finds a drug by identity key with binary search.
///
/// `drugs` must be sorted ascending by `id` (lexicographic). See the module
/// docs for what happens otherwise.
pub fn binary_search<'a>(drugs: &'a [Drug], id: &str) -> Option<&'a Drug> {
    binary_search_by_key(drugs, id, |d| d.id.as_str())
}

// =============================================================================
// Predicate Search
// =============================================================================

/// Returns every element satisfying `predicate`, in input order.
pub fn filter<'a, T, P>(items: &'a [T], mut predicate: P) -> Vec<&'a T>
where
    P: FnMut(&T) -> bool,
{
    items.iter().filter(|&item| predicate(item)).collect()
}

/// Case-insensitive "contains" check.
///
/// An empty needle matches everything.
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Drugs whose name contains `name` (case-insensitive).
pub fn search_by_name<'a>(drugs: &'a [Drug], name: &str) -> Vec<&'a Drug> {
    let needle = name.to_lowercase();
    filter(drugs, |d| contains_ignore_case(&d.name, &needle))
}

/// Drugs priced within `[min_price, max_price]`, bounds inclusive.
///
/// If `min_price > max_price` nothing can match and the result is empty.
/// Bounds must be real numbers; NaN bounds are a caller bug.
pub fn search_by_price_range(drugs: &[Drug], min_price: f64, max_price: f64) -> Vec<&Drug> {
    debug_assert!(
        !min_price.is_nan() && !max_price.is_nan(),
        "price bounds must not be NaN"
    );
    filter(drugs, |d| d.price >= min_price && d.price <= max_price)
}

/// Drugs with at least one supplier whose name contains `supplier_name`
/// (case-insensitive).
pub fn search_by_supplier<'a>(drugs: &'a [Drug], supplier_name: &str) -> Vec<&'a Drug> {
    let needle = supplier_name.to_lowercase();
    filter(drugs, |d| {
        d.suppliers
            .iter()
            .any(|s| contains_ignore_case(&s.name, &needle))
    })
}

/// Drugs with stock strictly below `threshold`.
pub fn search_low_stock(drugs: &[Drug], threshold: u32) -> Vec<&Drug> {
    filter(drugs, |d| d.stock < threshold)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::sort_by_id;
    use crate::types::SupplierRef;

    fn ids(drugs: &[&Drug]) -> Vec<String> {
        drugs.iter().map(|d| d.id.clone()).collect()
    }

    fn sample() -> Vec<Drug> {
        let mut amox = Drug::new("D1", "Amox", 10, 5.0);
        amox.add_supplier(SupplierRef::new("S1", "MedSupply Ghana"));
        let mut panadol = Drug::new("D2", "Panadol Extra", 3, 2.5);
        panadol.add_supplier(SupplierRef::new("S2", "PharmaLink"));
        panadol.add_supplier(SupplierRef::new("S1", "MedSupply Ghana"));
        let ibuprofen = Drug::new("D3", "Ibuprofen", 40, 3.0);
        vec![panadol, ibuprofen, amox]
    }

    #[test]
    fn test_linear_search_any_order() {
        let drugs = sample();
        assert_eq!(linear_search(&drugs, "D1").map(|d| d.name.as_str()), Some("Amox"));
        assert_eq!(linear_search(&drugs, "D2").map(|d| d.stock), Some(3));
        assert!(linear_search(&drugs, "D9").is_none());
        assert!(linear_search(&[], "D1").is_none());
    }

    #[test]
    fn test_binary_search_sorted() {
        let mut drugs = sample();
        sort_by_id(&mut drugs);
        for id in ["D1", "D2", "D3"] {
            assert_eq!(binary_search(&drugs, id).map(|d| d.id.as_str()), Some(id));
        }
        assert!(binary_search(&drugs, "D0").is_none());
        assert!(binary_search(&drugs, "D25").is_none());
        assert!(binary_search(&drugs, "D9").is_none());
        assert!(binary_search(&[], "D1").is_none());
    }

    #[test]
    fn test_binary_search_unsorted_does_not_panic() {
        // Unspecified result, but it must terminate cleanly.
        let drugs = vec![
            Drug::new("Z", "z", 0, 0.0),
            Drug::new("A", "a", 0, 0.0),
            Drug::new("M", "m", 0, 0.0),
        ];
        let hit = binary_search(&drugs, "A");
        if let Some(drug) = hit {
            assert_eq!(drug.id, "A");
        }
    }

    #[test]
    fn test_generic_search_by_key() {
        let words = ["apple", "banana", "cherry", "date"];
        assert_eq!(binary_search_by_key(&words, "cherry", |w| *w), Some(&"cherry"));
        assert_eq!(linear_search_by_key(&words, "date", |w| *w), Some(&"date"));
        assert_eq!(binary_search_by_key(&words, "fig", |w| *w), None);
    }

    #[test]
    fn test_filter_preserves_order() {
        let values = [5, 1, 4, 2, 3];
        let even = filter(&values, |v| v % 2 == 0);
        assert_eq!(even, vec![&4, &2]);
        assert!(filter(&values, |v| *v > 10).is_empty());
    }

    #[test]
    fn test_search_by_name_case_insensitive() {
        let drugs = sample();
        assert_eq!(ids(&search_by_name(&drugs, "PANA")), vec!["D2"]);
        assert_eq!(ids(&search_by_name(&drugs, "o")), vec!["D2", "D3", "D1"]);
        assert!(search_by_name(&drugs, "aspirin").is_empty());
        assert_eq!(search_by_name(&drugs, "").len(), 3);
    }

    #[test]
    fn test_search_by_price_range_inclusive() {
        let drugs = sample();
        assert_eq!(ids(&search_by_price_range(&drugs, 2.5, 3.0)), vec!["D2", "D3"]);
        assert_eq!(ids(&search_by_price_range(&drugs, 5.0, 5.0)), vec!["D1"]);
        assert!(search_by_price_range(&drugs, 4.0, 1.0).is_empty());
    }

    #[test]
    fn test_search_by_supplier() {
        let drugs = sample();
        assert_eq!(ids(&search_by_supplier(&drugs, "medsupply")), vec!["D2", "D1"]);
        assert_eq!(ids(&search_by_supplier(&drugs, "LINK")), vec!["D2"]);
        assert!(search_by_supplier(&drugs, "unknown").is_empty());
    }

    #[test]
    fn test_search_low_stock() {
        let drugs = sample();
        assert_eq!(ids(&search_low_stock(&drugs, 10)), vec!["D2"]);
        assert_eq!(ids(&search_low_stock(&drugs, 11)), vec!["D2", "D1"]);
        assert!(search_low_stock(&drugs, 0).is_empty());
    }

    #[test]
    fn test_infinite_price_bounds_are_open_ended() {
        let drugs = sample();
        assert_eq!(
            search_by_price_range(&drugs, f64::NEG_INFINITY, f64::INFINITY).len(),
            drugs.len()
        );
        assert_eq!(ids(&search_by_price_range(&drugs, 3.0, f64::INFINITY)), vec!["D3", "D1"]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "price bounds must not be NaN")]
    fn test_nan_price_bound_panics_in_debug() {
        search_by_price_range(&sample(), f64::NAN, 10.0);
    }
}
