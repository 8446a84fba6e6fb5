//! # pharmacy-system: Pharmacy Orchestration
//!
//! Wires the pure catalog engine from `pharmacy-core` to a
//! [`PharmacyStore`](pharmacy_db::PharmacyStore), and keeps supplier,
//! customer and purchase bookkeeping consistent with the drug catalog.
//!
//! ## Module Organization
//!
//! - [`pharmacy`] - The `Pharmacy` orchestration object
//! - [`config`] - TOML + environment configuration
//! - [`report`] - Revenue and inventory reports
//! - [`error`] - System error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmacy_db::Database;
//! use pharmacy_system::{Pharmacy, PharmacyConfig};
//!
//! let config = PharmacyConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let mut pharmacy = Pharmacy::load(db, config).await?;
//!
//! pharmacy.add_drug(Drug::new("D1", "Amoxicillin", 10, 5.0)).await?;
//! pharmacy.record_purchase("C1", "D1", 2).await?;
//! println!("revenue: {:.2}", pharmacy.total_revenue());
//! ```

pub mod config;
pub mod error;
pub mod pharmacy;
pub mod report;

pub use config::{LookupMode, PharmacyConfig};
pub use error::{SystemError, SystemResult};
pub use pharmacy::{DrugUpdate, Pharmacy};
pub use report::InventoryReport;
