//! Inventory service error taxonomy.

use chrono::NaiveDate;
use thiserror::Error;

use pharmatrack_core::DrugId;

use crate::repository::RepoError;

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Business-level failure of an inventory operation.
///
/// Every variant is returned to the caller as a value; the service never
/// retries or logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Drug not found")]
    NotFound(DrugId),

    #[error("Drug with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Duplicate SKU '{0}' in batch data")]
    DuplicateInBatch(String),

    #[error("SKUs already exist in database: {}", .0.join(", "))]
    SkusAlreadyExist(Vec<String>),

    #[error("No drug data provided")]
    EmptyBatch,

    #[error("Invalid expiration date format. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Expiration date cannot be in the past")]
    ExpiredDate(NaiveDate),

    /// The store rejected a write (e.g. a concurrent insert won the SKU).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Store(RepoError),
}

impl From<RepoError> for InventoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ConstraintViolation(msg) => Self::ConstraintViolation(msg),
            RepoError::DuplicateSku(sku) => Self::DuplicateSku(sku),
            other => Self::Store(other),
        }
    }
}
