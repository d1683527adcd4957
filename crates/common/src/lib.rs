//! Shared types used across the checkout workspace.
//!
//! Identifiers are string newtypes so that entities keep the identity they
//! were given (e.g. `"c1"` or a generated UUID) while still being impossible
//! to mix up with each other at compile time.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerId, OrderId, OrderItemId, ProductId};
