//! # Error Types
//!
//! Two enums cover everything the pure layer can reject:
//!
//! ```text
//!   ValidationError   bad input: empty key, NaN price, quantity 0 ...
//!        │ #[from]
//!        ▼
//!   CoreError         a workflow that cannot go on: unknown drug,
//!                     unknown customer, not enough stock
//! ```
//!
//! The store and orchestration crates wrap `CoreError` in their own enums.
//!
//! Lookup misses are NOT errors anywhere in the catalog engine. `Catalog::get`
//! returns `None`, `Catalog::remove` returns `false` and searches return an
//! empty `Vec`. `CoreError::DrugNotFound` is only raised by workflows that
//! cannot proceed without the drug (e.g. recording a purchase).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// A catalog workflow could not complete.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Drug key is not in the catalog.
    #[error("Drug not found: {0}")]
    DrugNotFound(String),

    /// Supplier key is not known.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Customer key is not known.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A purchase asked for more units than are on the shelf. Stock is
    /// left untouched.
    #[error("Insufficient stock for {drug_id}: available {available}, requested {requested}")]
    InsufficientStock {
        drug_id: String,
        available: u32,
        requested: u32,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input.
///
/// Raised by [`crate::validation`] before the orchestration layer touches
/// the catalog. The catalog itself accepts any record.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Empty or whitespace-only.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must lie in {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Floating point value is NaN or infinite.
    #[error("{field} must be a finite number")]
    MustBeFinite { field: String },

    /// e.g. whitespace inside a key.
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
