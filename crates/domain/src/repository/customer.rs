use async_trait::async_trait;
use common::CustomerId;
use store::{CustomerRow, CustomerStore};

use super::Repository;
use crate::customer::{Address, Customer};
use crate::error::{DomainError, Result};

const ENTITY: &str = "Customer";

/// Customer repository over any [`CustomerStore`].
#[derive(Debug, Clone)]
pub struct CustomerRepository<S> {
    store: S,
}

impl<S: CustomerStore> CustomerRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

pub(crate) fn customer_row(customer: &Customer) -> CustomerRow {
    let address = customer.address();
    CustomerRow {
        id: customer.id().clone(),
        name: customer.name().to_string(),
        street: address.map(|a| a.street().to_string()),
        number: address.map(|a| i64::from(a.number())),
        zip: address.map(|a| a.zip().to_string()),
        city: address.map(|a| a.city().to_string()),
        active: customer.is_active(),
        reward_points: customer.reward_points(),
    }
}

fn customer_from_row(row: CustomerRow) -> Result<Customer> {
    let corrupt = |reason: String| DomainError::corrupt(ENTITY, &row.id, reason);

    let address = match (&row.street, row.number, &row.zip, &row.city) {
        (Some(street), Some(number), Some(zip), Some(city)) => {
            let number = u32::try_from(number)
                .map_err(|_| corrupt(format!("address number {number} out of range")))?;
            let address = Address::new(street.clone(), number, zip.clone(), city.clone())
                .map_err(|e| corrupt(e.to_string()))?;
            Some(address)
        }
        (None, None, None, None) => None,
        _ => return Err(corrupt("partial address".to_string())),
    };

    Customer::restore(
        row.id.clone(),
        row.name.clone(),
        address,
        row.active,
        row.reward_points,
    )
    .map_err(|e| corrupt(e.to_string()))
}

#[async_trait]
impl<S: CustomerStore> Repository<Customer> for CustomerRepository<S> {
    type Id = CustomerId;

    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id()))]
    async fn create(&self, customer: &Customer) -> Result<()> {
        self.store.insert_customer(customer_row(customer)).await?;
        tracing::info!("customer created");
        Ok(())
    }

    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id()))]
    async fn update(&self, customer: &Customer) -> Result<()> {
        self.store.save_customer(&customer_row(customer)).await?;
        tracing::debug!("customer updated");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(customer_id = %id))]
    async fn find(&self, id: &CustomerId) -> Result<Customer> {
        let row = self
            .store
            .load_customer(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        customer_from_row(row)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Customer>> {
        let rows = self.store.load_all_customers().await?;
        rows.into_iter().map(customer_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trip_with_address() {
        let mut customer = Customer::new("c1", "Customer 1").unwrap();
        customer.change_address(Address::new("Street 1", 1, "Zipcode 1", "City 1").unwrap());
        customer.activate().unwrap();
        customer.add_reward_points(15).unwrap();

        let row = customer_row(&customer);
        assert_eq!(row.number, Some(1));
        assert_eq!(customer_from_row(row).unwrap(), customer);
    }

    #[test]
    fn row_without_address() {
        let customer = Customer::new("c1", "Customer 1").unwrap();
        let row = customer_row(&customer);
        assert_eq!(row.street, None);
        assert_eq!(customer_from_row(row).unwrap().address(), None);
    }

    #[test]
    fn partial_address_is_corrupt() {
        let mut row = customer_row(&Customer::new("c1", "Customer 1").unwrap());
        row.street = Some("Street 1".to_string());
        assert!(matches!(
            customer_from_row(row),
            Err(DomainError::CorruptRow { entity: "Customer", .. })
        ));
    }
}
