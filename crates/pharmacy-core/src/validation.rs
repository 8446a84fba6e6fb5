//! # Validation Module
//!
//! Input validation for catalog writes and searches.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Pharmacy (pharmacy-system)                                   │
//! │  └── THIS MODULE: field rules before the catalog is touched            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog (pharmacy-core)                                      │
//! │  └── Accepts any record; enforces key uniqueness only                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmacy_core::validation::{validate_drug_id, validate_price};
//!
//! assert!(validate_drug_id("AMX-500").is_ok());
//! assert!(validate_price(f64::NAN).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::Drug;
use crate::{MAX_PURCHASE_QUANTITY, MAX_QUERY_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identity key (drug, supplier or customer).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - No whitespace (keys are compared byte-for-byte)
fn validate_key(field: &str, key: &str) -> ValidationResult<()> {
    if key.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if key.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if key.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a drug identity key.
///
/// ```rust
/// use pharmacy_core::validation::validate_drug_id;
///
/// assert!(validate_drug_id("D1").is_ok());
/// assert!(validate_drug_id("").is_err());
/// assert!(validate_drug_id("D 1").is_err());
/// ```
pub fn validate_drug_id(id: &str) -> ValidationResult<()> {
    validate_key("drug id", id)
}

/// Validates a supplier identity key.
pub fn validate_supplier_id(id: &str) -> ValidationResult<()> {
    validate_key("supplier id", id)
}

/// Validates a customer identity key.
pub fn validate_customer_id(id: &str) -> ValidationResult<()> {
    validate_key("customer id", id)
}

/// Validates a display name (drug, supplier, customer).
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty queries are allowed (they match everything).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be finite (no NaN, no infinity)
/// - Must be non-negative; zero is allowed (free samples)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::MustBeFinite {
            field: "price".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the bounds of a price range search.
///
/// Only finiteness is checked. `min > max` is legal and yields no matches.
pub fn validate_price_range(min_price: f64, max_price: f64) -> ValidationResult<()> {
    for (field, value) in [("min price", min_price), ("max price", max_price)] {
        if value.is_nan() {
            return Err(ValidationError::MustBeFinite {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a purchase quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_PURCHASE_QUANTITY`]
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PURCHASE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_PURCHASE_QUANTITY),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every user-supplied field of a drug.
pub fn validate_drug(drug: &Drug) -> ValidationResult<()> {
    validate_drug_id(&drug.id)?;
    validate_name(&drug.name)?;
    validate_price(drug.price)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_keys() {
        assert!(validate_drug_id("D1").is_ok());
        assert!(validate_drug_id("AMX-500_mg").is_ok());
        assert!(validate_supplier_id("S1").is_ok());
        assert!(validate_customer_id("C-001").is_ok());

        assert!(validate_drug_id("").is_err());
        assert!(validate_drug_id("has space").is_err());
        assert!(validate_drug_id(&"A".repeat(51)).is_err());
        assert_eq!(
            validate_customer_id(""),
            Err(ValidationError::Required {
                field: "customer id".to_string()
            })
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Amoxicillin 500mg").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  amox ").unwrap(), "amox");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(5.25).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_price_range() {
        assert!(validate_price_range(1.0, 3.0).is_ok());
        assert!(validate_price_range(3.0, 1.0).is_ok());
        assert!(validate_price_range(0.0, f64::INFINITY).is_ok());
        assert!(validate_price_range(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_drug() {
        assert!(validate_drug(&Drug::new("D1", "Amox", 10, 5.0)).is_ok());
        assert!(validate_drug(&Drug::new("", "Amox", 10, 5.0)).is_err());
        assert!(validate_drug(&Drug::new("D1", "", 10, 5.0)).is_err());
        assert!(validate_drug(&Drug::new("D1", "Amox", 10, -1.0)).is_err());
    }
}
