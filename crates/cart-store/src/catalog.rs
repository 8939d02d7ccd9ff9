//! Local copy of catalog products.
//!
//! The catalog is owned by another service; this table only mirrors the
//! name and price needed to price carts.

use chrono::{DateTime, Utc};
use common::ProductId;
use rust_decimal::Decimal;
use serde::Serialize;

/// A catalog product as mirrored into the cart service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Stock level reported by the catalog. Not enforced against carts.
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product stamped with the current time.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        quantity: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }
}
