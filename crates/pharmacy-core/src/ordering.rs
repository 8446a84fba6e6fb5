//! # Ordering Engine
//!
//! Comparator-driven in-place sorting over any slice.
//!
//! ## Algorithms
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Partition-Exchange vs Merge                          │
//! │                                                                         │
//! │  PARTITION-EXCHANGE (quick_sort)    │  MERGE (merge_sort)               │
//! │  ───────────────────────────────    │  ─────────────────                │
//! │  • Pivot = last element of range    │  • Split halves, sort, merge      │
//! │  • Average O(n log n)               │  • O(n log n) always              │
//! │  • Worst case O(n²)                 │  • Stable: ties keep input order  │
//! │  • NOT stable                       │  • O(n/2) scratch buffer          │
//! │  • No allocation                    │                                   │
//! │                                                                         │
//! │  sort_by_name  → partition-exchange                                    │
//! │  sort_by_price → partition-exchange                                    │
//! │  sort_by_id    → merge                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Comparators are three-way: `FnMut(&T, &T) -> Ordering`. Both algorithms
//! treat the comparator as a total order for the comparisons they make.
//!
//! ## Usage
//! ```rust
//! use pharmacy_core::ordering::{merge_sort, quick_sort};
//!
//! let mut values = vec![5, 3, 9, 1];
//! quick_sort(&mut values, |a, b| a.cmp(b));
//! assert_eq!(values, vec![1, 3, 5, 9]);
//!
//! let mut pairs = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
//! merge_sort(&mut pairs, |a, b| a.0.cmp(&b.0));
//! assert_eq!(pairs, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Drug;

// =============================================================================
// Algorithm Selection
// =============================================================================

/// Which sorting algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    /// Quicksort-style partition exchange (unstable).
    PartitionExchange,
    /// Top-down merge sort (stable).
    Merge,
}

impl SortAlgorithm {
    /// Sorts `items` in place with this algorithm.
    pub fn sort<T, F>(self, items: &mut [T], cmp: F)
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        match self {
            SortAlgorithm::PartitionExchange => quick_sort(items, cmp),
            SortAlgorithm::Merge => merge_sort(items, cmp),
        }
    }

    /// Returns true if equal elements keep their relative order.
    pub const fn is_stable(self) -> bool {
        matches!(self, SortAlgorithm::Merge)
    }
}

// =============================================================================
// Partition-Exchange Sort
// =============================================================================

/// Sorts `items` in place using partition-exchange (quicksort).
///
/// The pivot is the last element of the active range. Elements ordered
/// less-than-or-equal to the pivot are swapped to its left. The smaller
/// partition is handled recursively and the larger one iteratively, which
/// keeps stack depth at O(log n) even on already sorted input.
pub fn quick_sort<T, F>(items: &mut [T], mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    quick_sort_range(items, &mut cmp);
}

fn quick_sort_range<T, F>(mut items: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    while items.len() > 1 {
        let pivot = partition(items, cmp);

        let range = std::mem::take(&mut items);
        let (left, rest) = range.split_at_mut(pivot);
        let right = &mut rest[1..];

        if left.len() < right.len() {
            quick_sort_range(left, cmp);
            items = right;
        } else {
            quick_sort_range(right, cmp);
            items = left;
        }
    }
}

/// Lomuto partition around the last element. Returns the pivot's final index.
fn partition<T, F>(items: &mut [T], cmp: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let high = items.len() - 1;
    let mut boundary = 0;

    for j in 0..high {
        if cmp(&items[j], &items[high]) != Ordering::Greater {
            items.swap(boundary, j);
            boundary += 1;
        }
    }

    items.swap(boundary, high);
    boundary
}

// =============================================================================
// Merge Sort
// =============================================================================

/// Sorts `items` in place using a stable top-down merge sort.
///
/// On ties the element from the left half is taken first, so equal elements
/// keep their input order.
pub fn merge_sort<T, F>(items: &mut [T], mut cmp: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }
    let mut scratch = Vec::with_capacity(items.len() / 2 + 1);
    merge_sort_range(items, &mut scratch, &mut cmp);
}

fn merge_sort_range<T, F>(items: &mut [T], scratch: &mut Vec<T>, cmp: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }

    let mid = items.len() / 2;
    {
        let (left, right) = items.split_at_mut(mid);
        merge_sort_range(left, scratch, cmp);
        merge_sort_range(right, scratch, cmp);
    }
    merge(items, mid, scratch, cmp);
}

/// Merges the sorted runs `items[..mid]` and `items[mid..]`.
///
/// Only the left run is copied out. The write cursor `k` never passes the
/// right cursor `j`, so right elements can be moved down by swapping.
fn merge<T, F>(items: &mut [T], mid: usize, scratch: &mut Vec<T>, cmp: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    scratch.clear();
    scratch.extend_from_slice(&items[..mid]);

    let (mut i, mut j, mut k) = (0, mid, 0);

    while i < scratch.len() && j < items.len() {
        if cmp(&scratch[i], &items[j]) != Ordering::Greater {
            items[k] = scratch[i].clone();
            i += 1;
        } else {
            items.swap(k, j);
            j += 1;
        }
        k += 1;
    }

    while i < scratch.len() {
        items[k] = scratch[i].clone();
        i += 1;
        k += 1;
    }
    // Leftover right elements already sit in their final slots.
}

// =============================================================================
// Drug Comparators
// =============================================================================

/// Lexicographic by display name.
pub fn by_name(a: &Drug, b: &Drug) -> Ordering {
    a.name.cmp(&b.name)
}

/// Lexicographic by identity key.
pub fn by_id(a: &Drug, b: &Drug) -> Ordering {
    a.id.cmp(&b.id)
}

/// Numeric ascending by unit price.
///
/// Uses `f64::total_cmp`, so the order stays total even if a NaN price
/// slips past validation.
pub fn by_price(a: &Drug, b: &Drug) -> Ordering {
    a.price.total_cmp(&b.price)
}

// =============================================================================
// Sort Keys
// =============================================================================

/// The built-in drug orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Id,
    Price,
}

impl SortKey {
    /// The algorithm used for this key.
    ///
    /// Identity keys are unique, but callers sorting by key usually feed the
    /// result into binary search, so the guaranteed O(n log n) bound of merge
    /// sort is used there.
    pub const fn algorithm(self) -> SortAlgorithm {
        match self {
            SortKey::Id => SortAlgorithm::Merge,
            SortKey::Name | SortKey::Price => SortAlgorithm::PartitionExchange,
        }
    }

    /// The comparator for this key.
    pub fn comparator(self) -> fn(&Drug, &Drug) -> Ordering {
        match self {
            SortKey::Name => by_name,
            SortKey::Id => by_id,
            SortKey::Price => by_price,
        }
    }

    /// Sorts `drugs` in place by this key.
    pub fn sort(self, drugs: &mut [Drug]) {
        self.algorithm().sort(drugs, self.comparator());
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Id => write!(f, "id"),
            SortKey::Price => write!(f, "price"),
        }
    }
}

/// Sorts drugs by name using partition-exchange.
pub fn sort_by_name(drugs: &mut [Drug]) {
    SortKey::Name.sort(drugs);
}

/// Sorts drugs by identity key using merge sort.
pub fn sort_by_id(drugs: &mut [Drug]) {
    SortKey::Id.sort(drugs);
}

/// Sorts drugs by price using partition-exchange.
pub fn sort_by_price(drugs: &mut [Drug]) {
    SortKey::Price.sort(drugs);
}

// =============================================================================
// Unit Tests
// =============================================================================
