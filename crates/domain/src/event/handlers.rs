//! Handlers registered by the application at startup.
//!
//! Their side effects are log lines; each rejects events of a kind it was
//! not written for.

use super::{DomainEvent, EventHandler, EventPayload, HandlerError};

/// Logs a line when a customer is created.
///
/// Two instances are registered for `CustomerCreated`, each writing its own
/// line, so the order in which they run can be seen in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogWhenCustomerIsCreated {
    First,
    Second,
}

impl LogWhenCustomerIsCreated {
    pub fn message(&self) -> &'static str {
        match self {
            LogWhenCustomerIsCreated::First => "first log line of the event: CustomerCreated",
            LogWhenCustomerIsCreated::Second => "second log line of the event: CustomerCreated",
        }
    }
}

impl EventHandler for LogWhenCustomerIsCreated {
    fn name(&self) -> &'static str {
        match self {
            LogWhenCustomerIsCreated::First => "LogWhenCustomerIsCreated::First",
            LogWhenCustomerIsCreated::Second => "LogWhenCustomerIsCreated::Second",
        }
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let EventPayload::CustomerCreated(data) = event.payload() else {
            return Err(HandlerError::UnexpectedEvent(event.kind()));
        };
        tracing::info!(customer_id = %data.customer_id, "{}", self.message());
        Ok(())
    }
}

/// Notifies about a customer's new address.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendMessageWhenAddressChanges;

impl SendMessageWhenAddressChanges {
    /// Text sent for an address change.
    pub fn message(event: &DomainEvent) -> Result<String, HandlerError> {
        let EventPayload::CustomerAddressChanged(data) = event.payload() else {
            return Err(HandlerError::UnexpectedEvent(event.kind()));
        };
        Ok(format!(
            "address of customer {}, {} changed to: {}",
            data.customer_id, data.name, data.address
        ))
    }
}

impl EventHandler for SendMessageWhenAddressChanges {
    fn name(&self) -> &'static str {
        "SendMessageWhenAddressChanges"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let message = Self::message(event)?;
        tracing::info!(kind = %event.kind(), "{message}");
        Ok(())
    }
}

/// Sends a notification e-mail when a product is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendEmailWhenProductIsCreated;

impl EventHandler for SendEmailWhenProductIsCreated {
    fn name(&self) -> &'static str {
        "SendEmailWhenProductIsCreated"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let EventPayload::ProductCreated(data) = event.payload() else {
            return Err(HandlerError::UnexpectedEvent(event.kind()));
        };
        tracing::info!(
            product_id = %data.product_id,
            price = %data.price,
            "sending e-mail: product {} created",
            data.name
        );
        Ok(())
    }
}
