//! Customer aggregate and its address value object.

mod address;
mod entity;

pub use address::Address;
pub use entity::Customer;

use thiserror::Error;

/// Errors that can occur during customer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    #[error("Customer ID is required")]
    IdRequired,

    #[error("Customer name is required")]
    NameRequired,

    /// Only customers with an address can be activated.
    #[error("Address is mandatory to activate a customer")]
    AddressRequired,

    #[error("Reward points exceed the supported range")]
    RewardPointsOverflow,

    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),
}

/// Errors raised when building an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("street is required")]
    StreetRequired,

    #[error("number must be greater than 0")]
    NumberRequired,

    #[error("zip is required")]
    ZipRequired,

    #[error("city is required")]
    CityRequired,
}
