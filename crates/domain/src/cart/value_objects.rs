//! Value objects for the cart domain.

use common::ProductId;
use serde::{Deserialize, Serialize};

/// A product reference and the quantity of it held in a cart.
///
/// A quantity of zero or below is only meaningful as an update request: it
/// asks the cart to drop the line. Products stored in a cart always have a
/// positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartProduct {
    /// Creates a new cart product.
    pub fn new(product_id: impl Into<ProductId>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Returns true if this product asks for its line to be removed.
    pub fn is_removal(&self) -> bool {
        self.quantity <= 0
    }
}
