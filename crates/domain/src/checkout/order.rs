//! Order aggregate implementation.

use std::collections::HashSet;

use common::{CustomerId, Money, OrderId, OrderItemId};

use super::{OrderError, OrderItem};

/// Sums item totals. Returns None if the sum does not fit.
fn checked_total<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Option<Money> {
    items
        .into_iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total()))
}

/// Order aggregate root.
///
/// An order always holds at least one item, item ids are unique within
/// the order and the total fits in the amount range. Item order is kept for
/// display but does not take part in equality: two orders with the same
/// items in a different order are equal.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
}

impl Order {
    /// Creates a new order.
    ///
    /// Fails with `InvalidAggregateState` if `items` is empty, with
    /// `DuplicateItem` if two items share an id and with `AmountOverflow` if
    /// the total does not fit.
    pub fn new(
        id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        let order = Self {
            id: id.into(),
            customer_id: customer_id.into(),
            items,
        };
        order.validate()?;
        Ok(order)
    }

    fn validate(&self) -> Result<(), OrderError> {
        if self.id.is_blank() {
            return Err(OrderError::IdRequired);
        }
        if self.customer_id.is_blank() {
            return Err(OrderError::CustomerIdRequired);
        }
        if self.items.is_empty() {
            return Err(OrderError::no_items());
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id()) {
                return Err(OrderError::DuplicateItem {
                    item_id: item.id().clone(),
                });
            }
        }
        checked_total(&self.items).ok_or(OrderError::AmountOverflow)?;
        Ok(())
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the item with the given id, if any.
    pub fn item(&self, item_id: &OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id() == item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the sum of `price * quantity` over all items.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc.saturating_add(item.total()))
    }

    /// Reassigns the order to another customer.
    ///
    /// Whether the customer exists is checked by the store when the order is
    /// saved, not here.
    pub fn change_customer(
        &mut self,
        customer_id: impl Into<CustomerId>,
    ) -> Result<(), OrderError> {
        let customer_id = customer_id.into();
        if customer_id.is_blank() {
            return Err(OrderError::CustomerIdRequired);
        }
        self.customer_id = customer_id;
        Ok(())
    }

    /// Appends an item to the order.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        if self.item(item.id()).is_some() {
            return Err(OrderError::DuplicateItem {
                item_id: item.id().clone(),
            });
        }
        checked_total(self.items.iter().chain([&item])).ok_or(OrderError::AmountOverflow)?;
        self.items.push(item);
        Ok(())
    }

    /// Removes the item with the given id and returns it.
    ///
    /// Removing the last remaining item is rejected with
    /// `InvalidAggregateState`.
    pub fn remove_item(&mut self, item_id: &OrderItemId) -> Result<OrderItem, OrderError> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id() == item_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                item_id: item_id.clone(),
            })?;

        if self.items.len() == 1 {
            return Err(OrderError::no_items());
        }
        Ok(self.items.remove(pos))
    }

    /// Replaces the item that has the same id as `item`, keeping its
    /// position, and returns the previous item.
    pub fn replace_item(&mut self, item: OrderItem) -> Result<OrderItem, OrderError> {
        let others = self.items.iter().filter(|i| i.id() != item.id());
        if self.item(item.id()).is_some() && checked_total(others.chain([&item])).is_none() {
            return Err(OrderError::AmountOverflow);
        }
        let slot = self
            .items
            .iter_mut()
            .find(|i| i.id() == item.id())
            .ok_or_else(|| OrderError::ItemNotFound {
                item_id: item.id().clone(),
            })?;
        Ok(std::mem::replace(slot, item))
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.customer_id == other.customer_id
            && self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .all(|item| other.item(item.id()) == Some(item))
    }
}

impl Eq for Order {}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price_cents: i64, quantity: u32) -> OrderItem {
        OrderItem::new(
            id,
            format!("Item {id}"),
            Money::from_cents(price_cents),
            format!("p-{id}"),
            quantity,
        )
        .unwrap()
    }

    fn order_with(items: Vec<OrderItem>) -> Order {
        Order::new("o1", "c1", items).unwrap()
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let order = order_with(vec![item("1", 1000, 2), item("2", 2000, 3)]);
        assert_eq!(order.total().cents(), 8000);
    }

    #[test]
    fn total_of_single_item_order() {
        let order = order_with(vec![item("1", 150, 4)]);
        assert_eq!(order.total().cents(), 600);
    }

    #[test]
    fn total_with_zero_price_items() {
        let order = order_with(vec![item("1", 0, 10), item("2", 500, 1)]);
        assert_eq!(order.total().cents(), 500);
    }

    #[test]
    fn total_is_recomputed_after_mutation() {
        let mut order = order_with(vec![item("1", 1000, 1)]);
        assert_eq!(order.total().cents(), 1000);
        order.add_item(item("2", 500, 2)).unwrap();
        assert_eq!(order.total().cents(), 2000);
        order.remove_item(&OrderItemId::new("1")).unwrap();
        assert_eq!(order.total().cents(), 1000);
    }

    #[test]
    fn new_rejects_empty_items() {
        let result = Order::new("o1", "c1", vec![]);
        assert!(matches!(
            result,
            Err(OrderError::InvalidAggregateState { .. })
        ));
    }

    #[test]
    fn new_requires_ids() {
        assert_eq!(
            Order::new("", "c1", vec![item("1", 1, 1)]),
            Err(OrderError::IdRequired)
        );
        assert_eq!(
            Order::new("o1", "", vec![item("1", 1, 1)]),
            Err(OrderError::CustomerIdRequired)
        );
    }

    #[test]
    fn new_rejects_duplicate_item_ids() {
        let result = Order::new("o1", "c1", vec![item("1", 1, 1), item("1", 2, 2)]);
        assert_eq!(
            result,
            Err(OrderError::DuplicateItem {
                item_id: OrderItemId::new("1")
            })
        );
    }

    #[test]
    fn add_item_rejects_duplicate_id() {
        let mut order = order_with(vec![item("1", 100, 1)]);
        let result = order.add_item(item("1", 200, 1));
        assert!(matches!(result, Err(OrderError::DuplicateItem { .. })));
        assert_eq!(order.item_count(), 1);
    }

    #[test]
    fn add_then_remove_restores_items() {
        let mut order = order_with(vec![item("1", 100, 1), item("2", 200, 1)]);
        let before = order.clone();

        let extra = item("3", 300, 1);
        order.add_item(extra.clone()).unwrap();
        let removed = order.remove_item(extra.id()).unwrap();

        assert_eq!(removed, extra);
        assert_eq!(order, before);
        assert_eq!(order.items(), before.items());
    }

    #[test]
    fn remove_missing_item_fails() {
        let mut order = order_with(vec![item("1", 100, 1)]);
        let result = order.remove_item(&OrderItemId::new("9"));
        assert_eq!(
            result,
            Err(OrderError::ItemNotFound {
                item_id: OrderItemId::new("9")
            })
        );
    }

    #[test]
    fn remove_last_item_is_rejected() {
        let mut order = order_with(vec![item("1", 100, 1)]);
        let result = order.remove_item(&OrderItemId::new("1"));
        assert!(matches!(
            result,
            Err(OrderError::InvalidAggregateState { .. })
        ));
        assert_eq!(order.item_count(), 1);
    }

    #[test]
    fn remove_takes_first_match_and_keeps_order() {
        let mut order = order_with(vec![item("1", 1, 1), item("2", 1, 1), item("3", 1, 1)]);
        order.remove_item(&OrderItemId::new("2")).unwrap();
        let ids: Vec<_> = order.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn change_customer_replaces_customer_only() {
        let mut order = order_with(vec![item("1", 100, 1)]);
        order.change_customer("c2").unwrap();
        assert_eq!(order.customer_id(), &CustomerId::new("c2"));
        assert_eq!(order.item_count(), 1);
        assert_eq!(
            order.change_customer(""),
            Err(OrderError::CustomerIdRequired)
        );
    }

    #[test]
    fn replace_item_keeps_position() {
        let mut order = order_with(vec![item("1", 100, 1), item("2", 100, 1)]);
        let updated = order.items()[0].with_quantity(5).unwrap();
        let previous = order.replace_item(updated).unwrap();

        assert_eq!(previous.quantity(), 1);
        assert_eq!(order.items()[0].quantity(), 5);
        assert_eq!(order.total().cents(), 600);
        assert!(order.replace_item(item("7", 1, 1)).is_err());
    }

    #[test]
    fn total_out_of_range_is_rejected() {
        let half_max = i64::MAX / 2 + 1;
        assert_eq!(
            Order::new("o1", "c1", vec![item("1", half_max, 1), item("2", half_max, 1)]),
            Err(OrderError::AmountOverflow)
        );

        let mut order = order_with(vec![item("1", half_max, 1)]);
        assert_eq!(
            order.add_item(item("2", half_max, 1)),
            Err(OrderError::AmountOverflow)
        );
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.total().cents(), half_max);

        let mut order = order_with(vec![item("1", half_max, 1), item("2", 1, 1)]);
        assert_eq!(
            order.replace_item(item("2", half_max, 1)),
            Err(OrderError::AmountOverflow)
        );
        assert_eq!(order.items()[1].quantity(), 1);
    }

    #[test]
    fn total_at_the_limit_is_accepted() {
        let order = order_with(vec![item("1", i64::MAX - 1, 1), item("2", 1, 1)]);
        assert_eq!(order.total().cents(), i64::MAX);
    }

    #[test]
    fn equality_ignores_item_order() {
        let a = order_with(vec![item("1", 100, 1), item("2", 200, 1)]);
        let b = order_with(vec![item("2", 200, 1), item("1", 100, 1)]);
        assert_eq!(a, b);

        let c = order_with(vec![item("1", 100, 1), item("2", 200, 2)]);
        assert_ne!(a, c);
    }
}
