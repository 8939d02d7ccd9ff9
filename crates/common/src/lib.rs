//! Shared identifier types for the cart service.

pub mod types;

pub use types::{CustomerId, ProductId};
