//! # pharmacy-core: Catalog Search-and-Sort Engine
//!
//! This crate keeps a mutable collection of drug inventory records
//! consistent under add/remove/update, and provides the generic ordering
//! and lookup algorithms that run over it. Everything here is pure: no
//! database, no network, no file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pharmacy Catalog Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              pharmacy-system (Pharmacy orchestration)           │   │
//! │  │    add_drug, record_purchase, total_revenue, low_stock ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ pharmacy-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  catalog  │  │ ordering  │  │  lookup   │  │   │
//! │  │   │   Drug    │  │  Catalog  │  │ quick_sort│  │ linear    │  │   │
//! │  │   │ Supplier  │  │  upsert   │  │ merge_sort│  │ binary    │  │   │
//! │  │   │ Purchase  │  │  remove   │  │ sort_by_* │  │ filter    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pharmacy-db (Database Layer)                    │   │
//! │  │           SQLite queries, migrations, PharmacyStore             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Drug, Supplier, Customer, Purchase)
//! - [`catalog`] - Keyed drug collection with unique-key upsert
//! - [`ordering`] - Partition-exchange and merge sort over any slice
//! - [`lookup`] - Linear/binary search and predicate filters
//! - [`validation`] - Input validation for the orchestration layer
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pharmacy_core::{Catalog, Drug};
//!
//! let mut catalog = Catalog::new();
//! catalog.upsert(Drug::new("D1", "Amox", 10, 5.0));
//! catalog.upsert(Drug::new("D2", "Panadol", 3, 2.5));
//!
//! let cheap = catalog.search_by_price_range(1.0, 3.0);
//! assert_eq!(cheap.len(), 1);
//! assert_eq!(cheap[0].id, "D2");
//!
//! catalog.sort_by_price();
//! let ids: Vec<String> = catalog.all().into_iter().map(|d| d.id).collect();
//! assert_eq!(ids, vec!["D2", "D1"]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod lookup;
pub mod ordering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ordering::SortAlgorithm;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single drug in one purchase.
///
/// ## Business Reason
/// Prevents accidental over-dispensing (e.g., typing 1000 instead of 10).
pub const MAX_PURCHASE_QUANTITY: u32 = 999;

/// Maximum length of a free-text search query.
pub const MAX_QUERY_LEN: usize = 100;
