//! Product aggregate and product services.

mod entity;
mod service;

pub use entity::Product;
pub use service::ProductService;

use common::Money;
use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Product ID is required")]
    IdRequired,

    #[error("Product name is required")]
    NameRequired,

    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: Money },

    #[error("Price exceeds the supported range")]
    PriceOverflow,
}
