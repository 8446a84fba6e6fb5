//! # pharmacy-db
//!
//! SQLite persistence for the pharmacy catalog: drugs, suppliers,
//! customers and the purchase log. Callers normally hold a
//! [`PharmacyStore`]; the repositories are public for tools like `seed`.
//!
//! ```text
//!   Pharmacy<S: PharmacyStore>
//!        │  load_* / save_* / delete_drug
//!        ▼
//!   Database ── DrugRepository ───── drugs + drug_suppliers + drug_purchases
//!     │       ├ SupplierRepository ─ suppliers + supplier_drugs
//!     │       ├ CustomerRepository ─ customers + customer_purchases
//!     │       └ PurchaseRepository ─ purchases (append only)
//!     ▼
//!   SqlitePool ── migrations/sqlite/*.sql, applied on open
//! ```
//!
//! Child rows carry a `position` column, so a load hands back link lists
//! in the order they were saved.
//!
//! ```rust,ignore
//! use pharmacy_db::{Database, DbConfig, PharmacyStore};
//!
//! let db = Database::new(DbConfig::new("pharmacy.db")).await?;
//! let drugs = db.load_drugs().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::PharmacyStore;

pub use repository::customer::CustomerRepository;
pub use repository::drug::DrugRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::supplier::SupplierRepository;
