//! Cart persistence.
//!
//! A [`CartRepository`] loads a customer's line items, rebuilds the
//! [`domain::Cart`] aggregate, lets a caller-supplied function decide changes,
//! and replays the resulting events against storage inside one transaction.
//! The read side builds a [`domain::CartReadModel`] straight from a join query.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod service;
pub mod store;

pub use catalog::Product;
pub use error::{Result, StoreError};
pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;
pub use service::CartService;
pub use store::{CartRepository, CatalogRepository};
