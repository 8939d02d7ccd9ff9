//! Cart domain events.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::CartProduct;

/// A single decided change to a cart's line items.
///
/// Each variant carries exactly what is needed to replay it against the
/// line-item table keyed by `(customer_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new line item.
    AddedProduct { product: CartProduct },

    /// An existing line item's quantity was overwritten with `product.quantity`.
    ProductQuantityChanged { product: CartProduct },

    /// A line item was deleted.
    ProductRemoved { product_id: ProductId },
}

impl CartEvent {
    /// Returns the product this event touches.
    pub fn product_id(&self) -> &ProductId {
        match self {
            CartEvent::AddedProduct { product } | CartEvent::ProductQuantityChanged { product } => {
                &product.product_id
            }
            CartEvent::ProductRemoved { product_id } => product_id,
        }
    }
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::AddedProduct { .. } => "added_product",
            CartEvent::ProductQuantityChanged { .. } => "product_quantity_changed",
            CartEvent::ProductRemoved { .. } => "product_removed",
        }
    }
}
