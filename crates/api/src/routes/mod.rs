//! HTTP route handlers.

pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use domain::{
    CustomerRepository, DomainEvent, EventNotifier, OrderRepository, ProductRepository,
};
use store::{CustomerStore, OrderStore, ProductStore};

use crate::error::ApiError;

/// Store backends usable by the API: one value serving every table.
pub trait CheckoutStore: OrderStore + CustomerStore + ProductStore + Clone + 'static {}

impl<S> CheckoutStore for S where S: OrderStore + CustomerStore + ProductStore + Clone + 'static {}

/// Shared application state accessible from all handlers.
pub struct AppState<S: CheckoutStore> {
    pub customers: CustomerRepository<S>,
    pub products: ProductRepository<S>,
    pub orders: OrderRepository<S>,
    pub notifier: EventNotifier,
}

impl<S: CheckoutStore> AppState<S> {
    pub fn new(store: S, notifier: EventNotifier) -> Self {
        Self {
            customers: CustomerRepository::new(store.clone()),
            products: ProductRepository::new(store.clone()),
            orders: OrderRepository::new(store),
            notifier,
        }
    }

    /// Publishes events recorded by an aggregate that has been persisted.
    ///
    /// Handler failures are logged; the write they follow has already been
    /// committed and is not reported as failed.
    pub(crate) fn publish(&self, events: Vec<DomainEvent>) {
        for event in &events {
            if let Err(err) = self.notifier.notify(event) {
                tracing::warn!(error = %err, "event handlers failed");
            }
        }
    }
}

/// Rejects a required string field that is empty or whitespace.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}
