//! Checkout domain model.
//!
//! This crate provides:
//! - Customer and Product aggregates that record domain events
//! - Order aggregate with its line items and order services
//! - EventNotifier delivering domain events to registered handlers
//! - Reconciliation of an order's items against its stored rows
//! - Repositories mapping aggregates to the rows of the `store` crate

pub mod checkout;
pub mod customer;
pub mod error;
pub mod event;
pub mod product;
pub mod repository;

pub use checkout::{
    Order, OrderError, OrderFactory, OrderItem, OrderItemProps, OrderProps, OrderService,
};
pub use customer::{Address, AddressError, Customer, CustomerError};
pub use error::{DomainError, Result};
pub use event::{
    DispatchError, DomainEvent, EventHandler, EventKind, EventNotifier, EventPayload,
    HandlerError, LogWhenCustomerIsCreated, SendEmailWhenProductIsCreated,
    SendMessageWhenAddressChanges,
};
pub use product::{Product, ProductError, ProductService};
pub use repository::{CustomerRepository, OrderRepository, ProductRepository, Repository};
