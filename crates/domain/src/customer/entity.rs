use common::CustomerId;

use crate::event::{CustomerAddressChangedData, CustomerCreatedData, DomainEvent, EventPayload};

use super::{Address, CustomerError};

/// Customer aggregate root.
///
/// State changes that other parts of the system care about are recorded as
/// [`DomainEvent`]s; callers drain them with [`Customer::take_events`] and
/// hand them to an [`EventNotifier`](crate::event::EventNotifier).
#[derive(Debug, Clone)]
pub struct Customer {
    id: CustomerId,
    name: String,
    address: Option<Address>,
    active: bool,
    reward_points: i64,
    events: Vec<DomainEvent>,
}

impl Customer {
    /// Creates a new, inactive customer and records `CustomerCreated`.
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Result<Self, CustomerError> {
        let mut customer = Self::restore(id, name, None, false, 0)?;
        customer.record(EventPayload::CustomerCreated(CustomerCreatedData {
            customer_id: customer.id.clone(),
            name: customer.name.clone(),
        }));
        Ok(customer)
    }

    /// Rebuilds a customer from persisted state without recording events.
    pub fn restore(
        id: impl Into<CustomerId>,
        name: impl Into<String>,
        address: Option<Address>,
        active: bool,
        reward_points: i64,
    ) -> Result<Self, CustomerError> {
        let customer = Self {
            id: id.into(),
            name: name.into(),
            address,
            active,
            reward_points,
            events: Vec::new(),
        };
        customer.validate()?;
        if customer.active && customer.address.is_none() {
            return Err(CustomerError::AddressRequired);
        }
        Ok(customer)
    }

    fn validate(&self) -> Result<(), CustomerError> {
        if self.id.is_blank() {
            return Err(CustomerError::IdRequired);
        }
        if self.name.trim().is_empty() {
            return Err(CustomerError::NameRequired);
        }
        Ok(())
    }

    fn record(&mut self, payload: EventPayload) {
        self.events.push(DomainEvent::new(payload));
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reward_points(&self) -> i64 {
        self.reward_points
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), CustomerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CustomerError::NameRequired);
        }
        self.name = name;
        Ok(())
    }

    /// Sets the address and records `CustomerAddressChanged`.
    pub fn change_address(&mut self, address: Address) {
        self.address = Some(address.clone());
        self.record(EventPayload::CustomerAddressChanged(
            CustomerAddressChangedData {
                customer_id: self.id.clone(),
                name: self.name.clone(),
                address,
            },
        ));
    }

    /// Activates the customer. Requires an address.
    pub fn activate(&mut self) -> Result<(), CustomerError> {
        if self.address.is_none() {
            return Err(CustomerError::AddressRequired);
        }
        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Credits reward points. The balance is left unchanged on overflow.
    pub fn add_reward_points(&mut self, points: i64) -> Result<(), CustomerError> {
        self.reward_points = self
            .reward_points
            .checked_add(points)
            .ok_or(CustomerError::RewardPointsOverflow)?;
        Ok(())
    }

    /// Returns events recorded since the last call to [`Customer::take_events`].
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

// Pending events are transient and not part of the customer's identity.
impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.address == other.address
            && self.active == other.active
            && self.reward_points == other.reward_points
    }
}

impl Eq for Customer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn address() -> Address {
        Address::new("Street 1", 123, "13330-250", "São Paulo").unwrap()
    }

    #[test]
    fn new_requires_id_and_name() {
        assert_eq!(
            Customer::new("", "John").unwrap_err(),
            CustomerError::IdRequired
        );
        assert_eq!(
            Customer::new("123", "").unwrap_err(),
            CustomerError::NameRequired
        );
    }

    #[test]
    fn new_records_created_event() {
        let customer = Customer::new("123", "John").unwrap();
        let events = customer.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::CustomerCreated);
        assert!(!customer.is_active());
        assert_eq!(customer.reward_points(), 0);
    }

    #[test]
    fn change_name() {
        let mut customer = Customer::new("123", "John").unwrap();
        customer.change_name("Jane").unwrap();
        assert_eq!(customer.name(), "Jane");
        assert_eq!(
            customer.change_name(" "),
            Err(CustomerError::NameRequired)
        );
        assert_eq!(customer.name(), "Jane");
    }

    #[test]
    fn activate_requires_address() {
        let mut customer = Customer::new("1", "Customer 1").unwrap();
        assert_eq!(customer.activate(), Err(CustomerError::AddressRequired));

        customer.change_address(address());
        customer.activate().unwrap();
        assert!(customer.is_active());

        customer.deactivate();
        assert!(!customer.is_active());
    }

    #[test]
    fn change_address_records_event_with_new_address() {
        let mut customer = Customer::new("1", "Customer 1").unwrap();
        customer.take_events();

        customer.change_address(address());

        let events = customer.take_events();
        assert_eq!(events.len(), 1);
        match events[0].payload() {
            EventPayload::CustomerAddressChanged(data) => {
                assert_eq!(data.customer_id.as_str(), "1");
                assert_eq!(data.name, "Customer 1");
                assert_eq!(data.address, address());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
        assert!(customer.pending_events().is_empty());
    }

    #[test]
    fn reward_points_accumulate() {
        let mut customer = Customer::new("1", "Customer 1").unwrap();
        customer.add_reward_points(10).unwrap();
        customer.add_reward_points(10).unwrap();
        assert_eq!(customer.reward_points(), 20);
    }

    #[test]
    fn reward_points_overflow_keeps_balance() {
        let mut customer = Customer::restore("1", "Customer 1", None, false, i64::MAX - 1).unwrap();
        assert_eq!(
            customer.add_reward_points(2),
            Err(CustomerError::RewardPointsOverflow)
        );
        assert_eq!(customer.reward_points(), i64::MAX - 1);
        customer.add_reward_points(1).unwrap();
        assert_eq!(customer.reward_points(), i64::MAX);
    }

    #[test]
    fn restore_records_no_events() {
        let customer = Customer::restore("1", "Customer 1", Some(address()), true, 5).unwrap();
        assert!(customer.pending_events().is_empty());
        assert!(customer.is_active());
    }

    #[test]
    fn restore_rejects_active_without_address() {
        let result = Customer::restore("1", "Customer 1", None, true, 0);
        assert_eq!(result, Err(CustomerError::AddressRequired));
    }

    #[test]
    fn equality_ignores_pending_events() {
        let mut fresh = Customer::new("1", "Customer 1").unwrap();
        fresh.change_address(address());
        let restored = Customer::restore("1", "Customer 1", Some(address()), false, 0).unwrap();
        assert_eq!(fresh, restored);
    }
}
