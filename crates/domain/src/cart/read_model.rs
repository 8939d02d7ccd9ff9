//! Priced cart projection for display.

use common::{CustomerId, ProductId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A cart line joined with catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReadModelProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl CartReadModelProduct {
    /// Returns `price * quantity`, unrounded.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Read-only view of a customer's cart with catalog names and prices.
///
/// Built on demand and never persisted. The total is derived from the
/// products at construction time, so the fields are only exposed through
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReadModel {
    customer_id: CustomerId,
    products: Vec<CartReadModelProduct>,
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,
}

impl CartReadModel {
    /// Creates the read model and computes its total.
    pub fn new(customer_id: CustomerId, products: Vec<CartReadModelProduct>) -> Self {
        let total_price = total_price(&products);
        Self {
            customer_id,
            products,
            total_price,
        }
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn products(&self) -> &[CartReadModelProduct] {
        &self.products
    }

    /// Sum of `price * quantity` over all lines, rounded to cents.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn item_count(&self) -> usize {
        self.products.len()
    }

    /// Returns true for the default value, which belongs to no customer.
    pub fn is_zero(&self) -> bool {
        self.customer_id.is_empty()
    }
}

// Midpoints round away from zero (0.005 -> 0.01), not to even.
fn total_price(products: &[CartReadModelProduct]) -> Decimal {
    products
        .iter()
        .map(CartReadModelProduct::line_total)
        .sum::<Decimal>()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, quantity: i32, price: Decimal) -> CartReadModelProduct {
        CartReadModelProduct {
            product_id: ProductId::new(id),
            name: name.to_string(),
            quantity,
            price,
        }
    }

    fn read_model(products: Vec<CartReadModelProduct>) -> CartReadModel {
        CartReadModel::new(CustomerId::new("1"), products)
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = read_model(vec![]);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert!(!cart.is_zero());
    }

    #[test]
    fn default_is_zero() {
        assert!(CartReadModel::default().is_zero());
    }

    #[test]
    fn one_product() {
        let cart = read_model(vec![product("1", "test", 10, Decimal::new(10, 0))]);
        assert_eq!(cart.total_price(), Decimal::new(100, 0));
    }

    #[test]
    fn two_products() {
        let cart = read_model(vec![
            product("P1", "apple", 10, Decimal::new(10, 0)),
            product("P2", "banana", 1, Decimal::new(1055, 2)),
        ]);
        assert_eq!(cart.total_price(), Decimal::new(11055, 2));
    }

    #[test]
    fn sum_has_no_float_drift() {
        let cart = read_model(vec![
            product("P1", "apple", 1, Decimal::new(127, 2)),
            product("P2", "banana", 1, Decimal::new(1253, 2)),
        ]);
        assert_eq!(cart.total_price(), Decimal::new(1380, 2));
        assert_eq!(cart.total_price().to_string(), "13.80");
    }

    #[test]
    fn fixed_point_combinations() {
        // (price in cents, quantity) pairs with known exact totals.
        let cases: [(&[(i64, i32)], i64); 5] = [
            (&[(155, 1), (1055, 1)], 1210),
            (&[(127, 3), (1253, 2)], 2887),
            (&[(10, 3), (20, 3)], 90),
            (&[(1, 7), (99, 9), (33333, 1)], 34231),
            (&[(1999, 100)], 199900),
        ];

        for (lines, expected_cents) in cases {
            let products = lines
                .iter()
                .enumerate()
                .map(|(i, (cents, quantity))| {
                    product(&i.to_string(), "item", *quantity, Decimal::new(*cents, 2))
                })
                .collect();
            let cart = read_model(products);
            assert_eq!(cart.total_price(), Decimal::new(expected_cents, 2));
            assert!(cart.total_price().scale() <= 2);
        }
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        // banker's rounding would give 0.12 here
        let cart = read_model(vec![product("P1", "half", 1, Decimal::new(125, 3))]);
        assert_eq!(cart.total_price(), Decimal::new(13, 2));

        let cart = read_model(vec![product("P1", "half", 1, Decimal::new(135, 3))]);
        assert_eq!(cart.total_price(), Decimal::new(14, 2));
    }

    #[test]
    fn serializes_camel_case_with_numeric_prices() {
        let cart = read_model(vec![product("P1", "apple", 2, Decimal::new(1055, 2))]);
        let json = serde_json::to_value(&cart).unwrap();

        assert_eq!(json["customerId"], "1");
        assert_eq!(json["products"][0]["productId"], "P1");
        assert_eq!(json["products"][0]["name"], "apple");
        assert_eq!(json["products"][0]["quantity"], 2);
        assert_eq!(json["products"][0]["price"], 10.55);
        assert_eq!(json["totalPrice"], 21.1);
    }
}
