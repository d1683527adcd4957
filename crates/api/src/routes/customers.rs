//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::{Address, Customer, DomainError, Repository};
use serde::{Deserialize, Serialize};

use super::{AppState, CheckoutStore, require};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    /// Generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub address: Option<AddressDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddressDto {
    pub street: String,
    pub number: u32,
    pub zip: String,
    pub city: String,
}

impl AddressDto {
    fn into_address(self) -> Result<Address, ApiError> {
        Address::new(self.street, self.number, self.zip, self.city)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

impl From<&Address> for AddressDto {
    fn from(address: &Address) -> Self {
        Self {
            street: address.street().to_string(),
            number: address.number(),
            zip: address.zip().to_string(),
            city: address.city().to_string(),
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub address: Option<AddressDto>,
    pub active: bool,
    pub reward_points: i64,
}

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id().to_string(),
            name: customer.name().to_string(),
            address: customer.address().map(AddressDto::from),
            active: customer.is_active(),
            reward_points: customer.reward_points(),
        }
    }
}

// -- Handlers --

/// POST /customers: register a customer, optionally with an address.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let id = match req.id {
        Some(id) => {
            require("id", &id)?;
            CustomerId::new(id)
        }
        None => CustomerId::generate(),
    };

    let mut customer = Customer::new(id, req.name).map_err(DomainError::from)?;
    if let Some(address) = req.address {
        customer.change_address(address.into_address()?);
    }

    state.customers.create(&customer).await?;
    state.publish(customer.take_events());

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(&customer))))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.find(&CustomerId::new(id)).await?;
    Ok(Json(CustomerResponse::from(&customer)))
}

/// PUT /customers/{id}/address: replace the address and publish the change.
#[tracing::instrument(skip(state, req))]
pub async fn change_address<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddressDto>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let address = req.into_address()?;
    let mut customer = state.customers.find(&CustomerId::new(id)).await?;

    customer.change_address(address);
    state.customers.update(&customer).await?;
    state.publish(customer.take_events());

    Ok(Json(CustomerResponse::from(&customer)))
}
