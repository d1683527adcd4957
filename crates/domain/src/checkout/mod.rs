//! Checkout: the order aggregate, its line items, and order services.

mod factory;
mod item;
mod order;
pub mod reconcile;
mod service;

pub use factory::{OrderFactory, OrderItemProps, OrderProps};
pub use item::OrderItem;
pub use order::Order;
pub use service::OrderService;

use common::{Money, OrderItemId};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order ID is required.
    #[error("Order ID is required")]
    IdRequired,

    /// Customer ID is required.
    #[error("Customer ID is required")]
    CustomerIdRequired,

    /// The operation would leave the order in a state it may never be in.
    #[error("Invalid order state: {reason}")]
    InvalidAggregateState { reason: &'static str },

    /// Item not found in order.
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: OrderItemId },

    /// Another item in the order already uses this id.
    #[error("Duplicate item id: {item_id}")]
    DuplicateItem { item_id: OrderItemId },

    /// Item ID is required.
    #[error("Item ID is required")]
    ItemIdRequired,

    /// Product ID is required.
    #[error("Product ID is required")]
    ProductIdRequired,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid price.
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice { price: Money },

    /// An item or order total does not fit in the amount range.
    #[error("Amount exceeds the supported range")]
    AmountOverflow,
}

impl OrderError {
    pub(crate) fn no_items() -> Self {
        OrderError::InvalidAggregateState {
            reason: "an order must have at least one item",
        }
    }
}
