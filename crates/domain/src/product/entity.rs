use common::{Money, ProductId};

use crate::event::{DomainEvent, EventPayload, ProductCreatedData};

use super::ProductError;

/// Product aggregate root.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    events: Vec<DomainEvent>,
}

impl Product {
    /// Creates a new product and records `ProductCreated`.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> Result<Self, ProductError> {
        let mut product = Self::restore(id, name, price)?;
        let created = EventPayload::ProductCreated(ProductCreatedData {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        });
        product.events.push(DomainEvent::new(created));
        Ok(product)
    }

    /// Rebuilds a product from persisted state without recording events.
    pub fn restore(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> Result<Self, ProductError> {
        let product = Self {
            id: id.into(),
            name: name.into(),
            price,
            events: Vec::new(),
        };
        if product.id.is_blank() {
            return Err(ProductError::IdRequired);
        }
        if product.name.trim().is_empty() {
            return Err(ProductError::NameRequired);
        }
        check_price(price)?;
        Ok(product)
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), ProductError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::NameRequired);
        }
        self.name = name;
        Ok(())
    }

    pub fn change_price(&mut self, price: Money) -> Result<(), ProductError> {
        check_price(price)?;
        self.price = price;
        Ok(())
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

fn check_price(price: Money) -> Result<(), ProductError> {
    if price.is_negative() {
        return Err(ProductError::NegativePrice { price });
    }
    Ok(())
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.price == other.price
    }
}

impl Eq for Product {}
