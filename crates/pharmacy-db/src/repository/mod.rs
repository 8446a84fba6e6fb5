//! # Repository Module
//!
//! Database repository implementations for the pharmacy catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Aggregate Persistence                                │
//! │                                                                         │
//! │  db.drugs().upsert(&drug)                                               │
//! │       │                                                                 │
//! │       ▼   one transaction                                               │
//! │  ┌──────────────────────────────────────────┐                           │
//! │  │ INSERT .. ON CONFLICT(id) DO UPDATE      │  parent row               │
//! │  │ DELETE child rows WHERE owner = id       │                           │
//! │  │ INSERT child rows with position          │  suppliers, purchase ids  │
//! │  └──────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load_all() rebuilds each aggregate in insertion order                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DrugRepository`](drug::DrugRepository) - Drugs with supplier refs and purchase ids
//! - [`SupplierRepository`](supplier::SupplierRepository) - Suppliers with supplied drug ids
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers with purchase ids
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Append-only purchase history

use std::collections::HashMap;

use crate::error::{DbError, DbResult};

pub mod customer;
pub mod drug;
pub mod purchase;
pub mod supplier;

/// `(owner_id, value)` pair read from a child table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub owner_id: String,
    pub value: String,
}

/// Groups child rows by owner, keeping row order within each owner.
pub(crate) fn group_links(rows: Vec<LinkRow>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.owner_id).or_default().push(row.value);
    }
    grouped
}

/// Reads an INTEGER column back into a `u32` domain field.
pub(crate) fn column_u32(entity: &str, id: &str, column: &str, value: i64) -> DbResult<u32> {
    u32::try_from(value)
        .map_err(|_| DbError::corrupt(entity, id, format!("{column} {value} out of range")))
}
