//! Store-layer error type.
//!
//! Simple CRUD methods return `sqlx::Error` directly; orchestration methods
//! that also raise domain errors (not-found, validation, conflict, formula
//! rejection) return [`StoreError`], which the API layer maps onto HTTP
//! statuses without modification.

use teklif_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<teklif_core::formula::FormulaError> for StoreError {
    fn from(err: teklif_core::formula::FormulaError) -> Self {
        Self::Core(CoreError::Formula(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
