//! Cart aggregate implementation.

use common::{CustomerId, ProductId};

use crate::aggregate::{Aggregate, DomainEvent};

use super::{CartError, CartEvent, CartProduct};

/// Cart aggregate root.
///
/// A cart is rebuilt from the persisted line items on every write and thrown
/// away afterwards. It decides how an update request changes the line items and
/// records that decision as [`CartEvent`]s for the repository to replay.
///
/// Invariants:
/// - `customer_id` is never empty
/// - `products` holds at most one entry per product ID
/// - every product in `products` has a positive quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Customer who owns the cart.
    customer_id: CustomerId,

    /// Line items in insertion order.
    products: Vec<CartProduct>,

    /// Events recorded since construction.
    events: Vec<CartEvent>,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::AddedProduct { product } => match self.position(&product.product_id) {
                Some(index) => self.products[index].quantity = product.quantity,
                None => self.products.push(product.clone()),
            },
            CartEvent::ProductQuantityChanged { product } => {
                if let Some(index) = self.position(&product.product_id) {
                    self.products[index].quantity = product.quantity;
                }
            }
            CartEvent::ProductRemoved { product_id } => {
                if let Some(index) = self.position(product_id) {
                    self.products.remove(index);
                }
            }
        }
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.events
    }
}

// Query methods
impl Cart {
    /// Creates a cart for a customer from its current line items.
    ///
    /// `products` is taken verbatim; callers load it from storage where the
    /// `(customer_id, product_id)` key already guarantees uniqueness.
    pub fn new(customer_id: CustomerId, products: Vec<CartProduct>) -> Result<Self, CartError> {
        if customer_id.is_empty() {
            return Err(CartError::InvalidCustomerId);
        }

        Ok(Self {
            customer_id,
            products,
            events: Vec::new(),
        })
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the line items in insertion order.
    pub fn products(&self) -> &[CartProduct] {
        &self.products
    }

    /// Returns the events recorded since construction, in emission order.
    pub fn events(&self) -> &[CartEvent] {
        &self.events
    }

    /// Consumes the cart, returning its recorded events.
    pub fn into_events(self) -> Vec<CartEvent> {
        self.events
    }

    /// Returns a line item by product ID.
    pub fn get_product(&self, product_id: &ProductId) -> Option<&CartProduct> {
        self.products.iter().find(|p| &p.product_id == product_id)
    }

    /// Returns the summed quantity of all line items.
    pub fn total_quantity(&self) -> i64 {
        self.products.iter().map(|p| i64::from(p.quantity)).sum()
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.products
            .iter()
            .position(|p| &p.product_id == product_id)
    }
}

// Command methods
impl Cart {
    /// Sets a product's quantity in the cart to `target.quantity`.
    ///
    /// - quantity <= 0 removes the line if present, and is a no-op otherwise
    /// - quantity > 0 overwrites the quantity of an existing line, or appends a
    ///   new line
    ///
    /// At most one event is recorded per call. The quantity is overwritten,
    /// never incremented.
    pub fn update_products_in_cart(mut self, target: CartProduct) -> Result<Self, CartError> {
        let Some(event) = self.decide(target) else {
            return Ok(self);
        };

        tracing::trace!(
            customer_id = %self.customer_id,
            product_id = %event.product_id(),
            event_type = event.event_type(),
            "cart event recorded"
        );

        self.apply(&event);
        self.events.push(event);
        Ok(self)
    }

    fn decide(&self, target: CartProduct) -> Option<CartEvent> {
        let present = self.position(&target.product_id).is_some();

        match (target.is_removal(), present) {
            (true, true) => Some(CartEvent::ProductRemoved {
                product_id: target.product_id,
            }),
            (true, false) => None,
            (false, true) => Some(CartEvent::ProductQuantityChanged { product: target }),
            (false, false) => Some(CartEvent::AddedProduct { product: target }),
        }
    }
}
