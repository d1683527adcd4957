//! Order reconciliation.
//!
//! Computes the row batches that bring the stored item rows of an order in
//! line with the in-memory aggregate, so that unchanged items are rewritten
//! in place rather than deleted and recreated.

use std::collections::HashSet;

use common::{OrderId, OrderItemId};
use store::{OrderItemChanges, OrderItemRow, OrderRow};

use super::{Order, OrderItem};

/// Returns the parent row describing the order's current state.
pub fn order_row(order: &Order) -> OrderRow {
    OrderRow {
        id: order.id().clone(),
        customer_id: order.customer_id().clone(),
        total: order.total().cents(),
    }
}

/// Returns the row describing the item at `position` on an order.
pub fn item_row(order_id: &OrderId, position: usize, item: &OrderItem) -> OrderItemRow {
    OrderItemRow {
        id: item.id().clone(),
        order_id: order_id.clone(),
        position: position as i64,
        product_id: item.product_id().clone(),
        name: item.name().to_string(),
        price: item.price().cents(),
        quantity: i64::from(item.quantity()),
    }
}

/// Returns the rows for every item of the order, in item order.
pub fn item_rows(order: &Order) -> Vec<OrderItemRow> {
    order
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| item_row(order.id(), position, item))
        .collect()
}

/// Diffs the order's items against the rows currently stored for it.
///
/// - `to_delete`: stored ids not on the order, in stored order
/// - `to_insert`: items whose id is not stored, in item order
/// - `to_upsert`: items whose id is stored, in item order
///
/// Stored rows are matched by id only; rows that belong to another order
/// are ignored. Every written row carries the item's current position, so
/// upserts also move items that changed place.
pub fn reconcile(order: &Order, stored: &[OrderItemRow]) -> OrderItemChanges {
    let stored_ids: HashSet<&OrderItemId> = stored
        .iter()
        .filter(|row| &row.order_id == order.id())
        .map(|row| &row.id)
        .collect();

    let mut changes = OrderItemChanges::default();

    for (position, item) in order.items().iter().enumerate() {
        let row = item_row(order.id(), position, item);
        if stored_ids.contains(item.id()) {
            changes.to_upsert.push(row);
        } else {
            changes.to_insert.push(row);
        }
    }

    let mut deleted = HashSet::new();
    for row in stored.iter().filter(|row| &row.order_id == order.id()) {
        if order.item(&row.id).is_none() && deleted.insert(&row.id) {
            changes.to_delete.push(row.id.clone());
        }
    }

    changes
}
