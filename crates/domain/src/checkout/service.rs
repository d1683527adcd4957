use common::{Money, OrderId};

use crate::customer::Customer;
use crate::error::Result;

use super::{Order, OrderError, OrderItem};

/// Stateless operations spanning several orders or an order and its customer.
pub struct OrderService;

impl OrderService {
    /// Returns the combined total of the given orders, or `AmountOverflow`
    /// if it does not fit.
    pub fn total<'a>(
        orders: impl IntoIterator<Item = &'a Order>,
    ) -> std::result::Result<Money, OrderError> {
        orders
            .into_iter()
            .try_fold(Money::zero(), |acc, order| acc.checked_add(order.total()))
            .ok_or(OrderError::AmountOverflow)
    }

    /// Places a new order for `customer` and credits the customer with
    /// reward points worth half the order total (in cents, rounded down).
    ///
    /// On error the customer is left unchanged.
    #[tracing::instrument(
        skip(customer, items),
        fields(customer_id = %customer.id(), items = items.len())
    )]
    pub fn place_order(
        customer: &mut Customer,
        items: Vec<OrderItem>,
    ) -> Result<Order> {
        if items.is_empty() {
            return Err(OrderError::no_items().into());
        }

        let order = Order::new(OrderId::generate(), customer.id().clone(), items)?;
        customer.add_reward_points(order.total().half().cents())?;

        tracing::debug!(
            order_id = %order.id(),
            total = %order.total(),
            reward_points = customer.reward_points(),
            "order placed"
        );
        Ok(order)
    }
}
