//! Domain layer for the cart service.
//!
//! This crate provides the pure, synchronous part of the cart:
//! - Aggregate and DomainEvent traits
//! - Cart aggregate deciding add/update/remove as events
//! - CartReadModel, the priced projection used for display

pub mod aggregate;
pub mod cart;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{Cart, CartError, CartEvent, CartProduct, CartReadModel, CartReadModelProduct};
pub use common::{CustomerId, ProductId};
