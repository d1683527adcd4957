use common::{CustomerId, Money, OrderId, OrderItemId, ProductId};

use super::{Order, OrderError, OrderItem};

/// Input for creating an order item with a generated id.
#[derive(Debug, Clone)]
pub struct OrderItemProps {
    pub name: String,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// Input for creating an order with a generated id.
#[derive(Debug, Clone)]
pub struct OrderProps {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemProps>,
}

/// Builds orders from raw props, generating order and item ids.
pub struct OrderFactory;

impl OrderFactory {
    pub fn create(props: OrderProps) -> Result<Order, OrderError> {
        let items = props
            .items
            .into_iter()
            .map(|p| {
                OrderItem::new(
                    OrderItemId::generate(),
                    p.name,
                    p.price,
                    p.product_id,
                    p.quantity,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Order::new(OrderId::generate(), props.customer_id, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_order_with_generated_ids() {
        let props = OrderProps {
            customer_id: CustomerId::new("c1"),
            items: vec![
                OrderItemProps {
                    name: "Product 1".to_string(),
                    product_id: ProductId::new("p1"),
                    quantity: 1,
                    price: Money::from_cents(100),
                },
                OrderItemProps {
                    name: "Product 2".to_string(),
                    product_id: ProductId::new("p2"),
                    quantity: 2,
                    price: Money::from_cents(200),
                },
            ],
        };

        let order = OrderFactory::create(props).unwrap();

        assert!(!order.id().is_blank());
        assert_eq!(order.customer_id().as_str(), "c1");
        assert_eq!(order.item_count(), 2);
        assert_ne!(order.items()[0].id(), order.items()[1].id());
        assert_eq!(order.total().cents(), 500);
    }

    #[test]
    fn propagates_item_validation_errors() {
        let props = OrderProps {
            customer_id: CustomerId::new("c1"),
            items: vec![OrderItemProps {
                name: "Product 1".to_string(),
                product_id: ProductId::new("p1"),
                quantity: 0,
                price: Money::from_cents(100),
            }],
        };

        assert_eq!(
            OrderFactory::create(props),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        );
    }
}
