//! HTTP route handlers.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod products;

use cart_store::CartService;

/// Shared application state accessible from all handlers.
pub struct AppState<R> {
    pub cart_service: CartService<R>,
}
