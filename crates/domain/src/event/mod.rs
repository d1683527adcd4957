//! Domain events and their in-process notifier.

mod handlers;
mod notifier;

pub use handlers::{
    LogWhenCustomerIsCreated, SendEmailWhenProductIsCreated, SendMessageWhenAddressChanges,
};
pub use notifier::{DispatchError, EventHandler, EventNotifier, HandlerError, HandlerFailure};

use std::fmt;

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::customer::Address;

/// Key under which handlers are registered with the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CustomerCreated,
    CustomerAddressChanged,
    ProductCreated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CustomerCreated => "CustomerCreated",
            EventKind::CustomerAddressChanged => "CustomerAddressChanged",
            EventKind::ProductCreated => "ProductCreated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventPayload {
    /// A customer was registered.
    CustomerCreated(CustomerCreatedData),

    /// A customer's address was set or replaced.
    CustomerAddressChanged(CustomerAddressChangedData),

    /// A product was added to the catalogue.
    ProductCreated(ProductCreatedData),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::CustomerCreated(_) => EventKind::CustomerCreated,
            EventPayload::CustomerAddressChanged(_) => EventKind::CustomerAddressChanged,
            EventPayload::ProductCreated(_) => EventKind::ProductCreated,
        }
    }
}

/// Data for CustomerCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCreatedData {
    pub customer_id: CustomerId,
    pub name: String,
}

/// Data for CustomerAddressChanged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddressChangedData {
    pub customer_id: CustomerId,

    /// Customer name at the time of the change.
    pub name: String,

    /// The new address.
    pub address: Address,
}

/// Data for ProductCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
}

/// A fact that happened in the domain.
///
/// Events are immutable values: the timestamp is taken when the event is
/// built and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    occurred_at: DateTime<Utc>,
    payload: EventPayload,
}

impl DomainEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl From<EventPayload> for DomainEvent {
    fn from(payload: EventPayload) -> Self {
        Self::new(payload)
    }
}
