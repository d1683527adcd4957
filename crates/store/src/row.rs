//! Plain row records exchanged across the persistence boundary.
//!
//! Monetary columns are stored as integer cents.

use common::{CustomerId, OrderId, OrderItemId, ProductId};
use serde::{Deserialize, Serialize};

/// A persisted customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub name: String,
    pub street: Option<String>,
    pub number: Option<i64>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub active: bool,
    pub reward_points: i64,
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
}

/// The parent row of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub total: i64,
}

/// A persisted order line item. Keyed by `(order_id, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// Index of the item on its order. Items load in ascending position.
    pub position: i64,
    pub product_id: ProductId,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

/// An order row together with its item rows, by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

/// The three row batches that bring an order's stored items in line with
/// its current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemChanges {
    /// Stored item ids no longer present on the order.
    pub to_delete: Vec<OrderItemId>,

    /// Items not yet stored.
    pub to_insert: Vec<OrderItemRow>,

    /// Items already stored; written unconditionally.
    pub to_upsert: Vec<OrderItemRow>,
}

impl OrderItemChanges {
    /// Returns true if there is nothing to write for the items.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty() && self.to_upsert.is_empty()
    }
}
