//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::checkout::OrderError;
use crate::customer::CustomerError;
use crate::event::DispatchError;
use crate::product::ProductError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the row store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Customer error: {0}")]
    Customer(#[from] CustomerError),

    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// One or more event handlers failed.
    #[error("Event dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stored row could not be turned back into an aggregate.
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: &'static str,
        id: String,
        reason: String,
    },
}

impl DomainError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(entity: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        DomainError::CorruptRow {
            entity,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors caused by a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound { .. } | DomainError::Store(StoreError::NotFound { .. })
        )
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
