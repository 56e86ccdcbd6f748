use thiserror::Error;

use stockpack_core::DomainError;

use crate::event_store::EventStoreError;

/// Failure of a packed-picking operation.
#[derive(Debug, Error)]
pub enum PackingError {
    /// Deterministic business failure (unknown product, missing location...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Event store failure; nothing from the call was committed.
    #[error(transparent)]
    Store(#[from] EventStoreError),
}

impl PackingError {
    /// True for the validation failure raised on unknown products.
    pub fn is_validation(&self) -> bool {
        matches!(self, PackingError::Domain(e) if e.is_validation())
    }
}
