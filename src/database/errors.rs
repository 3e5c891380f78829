//! Error types for price store operations
//!
//! Every repository and facade operation returns a [`StoreError`]. Storage
//! failures keep the underlying diesel/r2d2 error as their source so callers
//! can decide between retrying and giving up.
//!
//! # Error Categories
//!
//! - **Validation Errors**: `InvalidSymbol`, `InvalidPrice` (raised before any storage access)
//! - **State Errors**: `SymbolNotFound`, `DuplicateSymbol`
//! - **Storage Errors**: `StorageUnavailable`, `QueryFailed`, `ExecFailed`, `DeleteFailed`

use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Symbol is empty or contains characters a ticker cannot carry
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Price is zero or negative
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// The catalog already holds this symbol
    #[error("Symbol already exists: {0}")]
    DuplicateSymbol(String),

    /// No catalog entry matches this symbol
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// A connection could not be checked out of the pool
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] PoolError),

    /// A read statement failed or returned a row that could not be decoded
    #[error("Query failed: {0}")]
    QueryFailed(#[source] DieselError),

    /// A write statement failed
    #[error("Statement execution failed: {0}")]
    ExecFailed(#[source] DieselError),

    /// The symbol deletion transaction aborted and was rolled back
    #[error("Symbol deletion rolled back: {0}")]
    DeleteFailed(#[source] DieselError),
}

impl StoreError {
    /// Returns true if the input was rejected before touching storage
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidSymbol(_) | StoreError::InvalidPrice(_)
        )
    }

    /// Returns true if the target symbol does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::SymbolNotFound(_))
    }

    /// Returns true if storage itself failed (connection, statement or transaction)
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            StoreError::StorageUnavailable(_)
                | StoreError::QueryFailed(_)
                | StoreError::ExecFailed(_)
                | StoreError::DeleteFailed(_)
        )
    }

    /// Classify a failed catalog insert
    pub(crate) fn from_insert(symbol: &str, err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::DuplicateSymbol(symbol.to_string())
            }
            other => StoreError::ExecFailed(other),
        }
    }

    /// Classify a failed ledger append; the ledger only accepts catalogued symbols
    pub(crate) fn from_append(symbol: &str, err: DieselError) -> Self {
        match err {
            DieselError::NotFound
            | DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                StoreError::SymbolNotFound(symbol.to_string())
            }
            other => StoreError::ExecFailed(other),
        }
    }

    /// Classify a failed read that looked up the symbol's catalog row
    pub(crate) fn from_read(symbol: &str, err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::SymbolNotFound(symbol.to_string()),
            other => StoreError::QueryFailed(other),
        }
    }

    /// Reclassify a statement failure raised inside the deletion transaction
    pub(crate) fn into_delete_failure(self) -> Self {
        match self {
            StoreError::QueryFailed(cause) | StoreError::ExecFailed(cause) => {
                StoreError::DeleteFailed(cause)
            }
            other => other,
        }
    }
}

/// Begin/commit failures surfaced by `Connection::transaction`
impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        StoreError::ExecFailed(err)
    }
}
