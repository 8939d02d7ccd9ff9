use std::time::Instant;

use async_trait::async_trait;
use common::{CustomerId, ProductId};
use domain::{Cart, CartError, CartEvent, CartProduct, CartReadModel, DomainEvent};

use crate::{Product, Result, StoreError};

/// Core trait for cart persistence.
///
/// The persisted line items are the state of record. A [`Cart`] only exists
/// for the duration of one [`CartRepository::save_cart`] call.
///
/// Implementations do not guard against concurrent saves for the same
/// customer: two saves that load the same rows can both commit, and the later
/// commit silently overwrites the earlier one's quantity changes.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Builds the priced view of a customer's cart.
    ///
    /// A customer without line items gets an empty read model, not an error.
    async fn get_by_customer_id(&self, customer_id: &CustomerId) -> Result<CartReadModel>;

    /// Loads the cart, lets `update_fn` decide changes, and persists them.
    ///
    /// The events recorded on the returned cart are replayed in emission order
    /// inside a single transaction. Either all of them are applied or, on the
    /// first failure, the transaction is rolled back and that failure returned.
    /// An error from `update_fn` aborts the call before any write.
    async fn save_cart<F>(&self, customer_id: &CustomerId, update_fn: F) -> Result<()>
    where
        F: FnOnce(Cart) -> std::result::Result<Cart, CartError> + Send;
}

/// Access to the local product catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Inserts a product, or replaces name, price and stock of an existing one.
    async fn create_product(&self, product: Product) -> Result<()>;

    /// Retrieves a product by ID.
    ///
    /// Returns None if the product doesn't exist.
    async fn get_product_by_id(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Deletes a product and every cart line referencing it.
    ///
    /// Returns false if the product didn't exist.
    async fn delete_product(&self, product_id: &ProductId) -> Result<bool>;
}

/// Rebuilds the cart from loaded line items and runs the caller's decision.
pub(crate) fn decide<F>(
    customer_id: &CustomerId,
    products: Vec<CartProduct>,
    update_fn: F,
) -> Result<Cart>
where
    F: FnOnce(Cart) -> std::result::Result<Cart, CartError>,
{
    let cart = Cart::new(customer_id.clone(), products).map_err(StoreError::Cart)?;
    update_fn(cart).map_err(StoreError::UpdateRejected)
}

pub(crate) fn record_event_applied(event: &CartEvent) {
    metrics::counter!("cart_events_applied_total", "event_type" => event.event_type()).increment(1);
}

pub(crate) fn record_save(started: Instant, result: &Result<()>) {
    metrics::counter!("cart_saves_total").increment(1);
    match result {
        Ok(()) => metrics::histogram!("cart_save_duration_seconds")
            .record(started.elapsed().as_secs_f64()),
        Err(e) => {
            tracing::debug!(error = %e, "cart save failed");
            metrics::counter!("cart_save_failures_total").increment(1);
        }
    }
}
