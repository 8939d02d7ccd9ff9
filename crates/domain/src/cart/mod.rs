//! Cart aggregate and related types.

mod aggregate;
mod events;
mod read_model;
mod value_objects;

pub use aggregate::Cart;
pub use events::CartEvent;
pub use read_model::{CartReadModel, CartReadModelProduct};
pub use value_objects::CartProduct;

use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A cart cannot be constructed without an owner.
    #[error("invalid customer ID")]
    InvalidCustomerId,
}

impl CartError {
    /// Stable machine-readable code, surfaced in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CartError::InvalidCustomerId => "cart.products.add.invalid_customer_id",
        }
    }
}
