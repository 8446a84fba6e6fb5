//! # System Error Types
//!
//! Error types for orchestration and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       System Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐  │
//! │  │  Domain         │  │   Store         │  │     Configuration       │  │
//! │  │                 │  │                 │  │                         │  │
//! │  │  CoreError      │  │  DbError        │  │  InvalidConfig          │  │
//! │  │  (not found,    │  │  (constraint,   │  │  ConfigLoadFailed       │  │
//! │  │  validation,    │  │  connection,    │  │  ConfigSaveFailed       │  │
//! │  │  stock)         │  │  corrupt row)   │  │                         │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharmacy_core::{CoreError, ValidationError};
use pharmacy_db::DbError;
use thiserror::Error;

/// Result type alias for orchestration operations.
pub type SystemResult<T> = Result<T, SystemError>;

/// Everything a `Pharmacy` operation or a config load can fail with.
#[derive(Debug, Error)]
pub enum SystemError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Validation, not-found and stock failures from the catalog domain.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// The store rejected a load or save. In-memory state is unchanged.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl SystemError {
    /// Returns true for caller mistakes (bad input, unknown keys, stock).
    pub fn is_client_error(&self) -> bool {
        matches!(self, SystemError::Core(_))
    }
}

impl From<ValidationError> for SystemError {
    fn from(err: ValidationError) -> Self {
        SystemError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for SystemError {
    fn from(err: std::io::Error) -> Self {
        SystemError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SystemError {
    fn from(err: toml::de::Error) -> Self {
        SystemError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SystemError {
    fn from(err: toml::ser::Error) -> Self {
        SystemError::ConfigSaveFailed(err.to_string())
    }
}
