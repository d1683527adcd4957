//! Row-level persistence for the checkout domain.
//!
//! Stores exchange plain row records ([`OrderRow`], [`OrderItemRow`], ...)
//! and never see domain aggregates. Two backends are provided:
//! [`InMemoryStore`] for tests and development, and [`PostgresStore`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod row;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use row::{CustomerRow, OrderItemChanges, OrderItemRow, OrderRecord, OrderRow, ProductRow};
pub use store::{CustomerStore, OrderStore, ProductStore};
