//! Repositories: aggregates in, rows out.
//!
//! Each repository converts between an aggregate and the plain rows of the
//! store crate, and runs on any backend implementing the matching store
//! trait.

mod customer;
mod order;
mod product;

pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;

use async_trait::async_trait;

use crate::error::Result;

/// CRUD access to one kind of aggregate.
#[async_trait]
pub trait Repository<T: Send + Sync>: Send + Sync {
    /// Identifier the aggregate is looked up by.
    type Id: Send + Sync + ?Sized;

    /// Persists a new aggregate.
    async fn create(&self, entity: &T) -> Result<()>;

    /// Persists the current state of an existing aggregate.
    async fn update(&self, entity: &T) -> Result<()>;

    /// Loads an aggregate. Fails with `NotFound` if it doesn't exist.
    async fn find(&self, id: &Self::Id) -> Result<T>;

    /// Loads every aggregate, ordered by id.
    async fn find_all(&self) -> Result<Vec<T>>;
}
