//! # Store Errors
//!
//! Every repository call returns [`DbResult`]. Raw `sqlx` failures are
//! sorted into the cases a caller can act on:
//!
//! ```text
//!   UNIQUE constraint failed   ──► UniqueViolation   (purchase id reused)
//!   FOREIGN KEY / CHECK        ──► ForeignKeyViolation / CheckViolation
//!   pool timed out / closed    ──► PoolExhausted / ConnectionFailed
//!   row decodes out of range   ──► CorruptRow        (raised by repositories)
//!   anything else              ──► QueryFailed / Internal
//! ```
//!
//! `pharmacy-system` wraps these as `SystemError::Store`.

use thiserror::Error;

/// Failure of a catalog store operation.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} {id} is not in the store")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a purchase with an existing id
    /// - Any PRIMARY KEY / UNIQUE index violation outside an upsert
    #[error("{field} '{value}' is already stored")]
    UniqueViolation { field: String, value: String },

    /// A link row points at a parent that does not exist.
    #[error("Dangling reference: {message}")]
    ForeignKeyViolation { message: String },

    /// Constraint check failed (negative stock, negative price ...).
    #[error("Check constraint failed: {0}")]
    CheckViolation(String),

    /// The catalog file could not be opened, or the pool is closed.
    #[error("Cannot reach catalog database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for a reason not listed above.
    #[error("Statement rejected: {0}")]
    QueryFailed(String),

    /// A stored row can't be turned back into a domain value.
    ///
    /// ## When This Occurs
    /// - A stock or quantity column holds a value outside `u32`
    /// - The file was edited by hand
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// No connection became free within `DbConfig::connect_timeout`.
    #[error("Timed out waiting for a catalog connection")]
    PoolExhausted,

    #[error("Unexpected store failure: {0}")]
    Internal(String),
}

impl DbError {
    /// `entity` is the aggregate name, e.g. `"Drug"`.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn corrupt(
        entity: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// SQLite reports constraint failures only through the message text, so
/// database errors are classified by prefix.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let text = db_err.message();

                // "UNIQUE constraint failed: purchases.id"
                if let Some(column) = text.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(column, "?")
                } else if text.starts_with("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: text.to_owned(),
                    }
                } else if text.starts_with("CHECK constraint failed") {
                    DbError::CheckViolation(text.to_owned())
                } else {
                    DbError::QueryFailed(text.to_owned())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".into()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
