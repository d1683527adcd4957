use common::{Money, OrderItemId, ProductId};
use serde::{Deserialize, Serialize};

use super::OrderError;

/// A line item of an order.
///
/// Items are immutable: changing the quantity produces a new item with the
/// same id (see [`OrderItem::with_quantity`]) which then replaces the old one
/// on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    name: String,
    price: Money,
    product_id: ProductId,
    quantity: u32,
}

impl OrderItem {
    /// Creates a new order item.
    ///
    /// The price may be zero but not negative; the quantity must be positive.
    pub fn new(
        id: impl Into<OrderItemId>,
        name: impl Into<String>,
        price: Money,
        product_id: impl Into<ProductId>,
        quantity: u32,
    ) -> Result<Self, OrderError> {
        let item = Self {
            id: id.into(),
            name: name.into(),
            price,
            product_id: product_id.into(),
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), OrderError> {
        if self.id.is_blank() {
            return Err(OrderError::ItemIdRequired);
        }
        if self.product_id.is_blank() {
            return Err(OrderError::ProductIdRequired);
        }
        if self.price.is_negative() {
            return Err(OrderError::InvalidPrice { price: self.price });
        }
        if self.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: self.quantity,
            });
        }
        if self.price.checked_multiply(self.quantity).is_none() {
            return Err(OrderError::AmountOverflow);
        }
        Ok(())
    }

    pub fn id(&self) -> &OrderItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price per unit.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the total price for this item (price * quantity).
    ///
    /// Construction rejects items whose total does not fit, so this never
    /// clamps.
    pub fn total(&self) -> Money {
        self.price.saturating_multiply(self.quantity)
    }

    /// Returns a copy of this item with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Result<Self, OrderError> {
        let item = Self {
            quantity,
            ..self.clone()
        };
        item.validate()?;
        Ok(item)
    }
}
