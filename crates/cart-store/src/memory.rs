use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use common::{CustomerId, ProductId};
use domain::{
    Cart, CartError, CartEvent, CartProduct, CartReadModel, CartReadModelProduct, DomainEvent,
};
use tokio::sync::RwLock;

use crate::{
    Product, Result, StoreError,
    store::{CartRepository, CatalogRepository, decide, record_event_applied, record_save},
};

#[derive(Debug, Clone)]
struct LineItem {
    customer_id: CustomerId,
    product_id: ProductId,
    quantity: i32,
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    /// Kept in insertion order.
    cart_products: Vec<LineItem>,
}

/// In-memory cart store for testing.
///
/// Mirrors the PostgreSQL schema: line items are keyed by
/// `(customer_id, product_id)`, must reference an existing product, and are
/// removed with their product. Saves stage changes on a copy of the line-item
/// table and swap it in only when every event applied.
///
/// Like the PostgreSQL store, loading and writing happen under separate locks,
/// so concurrent saves for the same customer can lose updates.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    tables: Arc<RwLock<Tables>>,
    fail_on_event: Arc<RwLock<Option<usize>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next save fail when it reaches the event at `index` (0-based).
    pub async fn fail_on_event(&self, index: usize) {
        *self.fail_on_event.write().await = Some(index);
    }

    /// Returns the total number of line items across all customers.
    pub async fn line_count(&self) -> usize {
        self.tables.read().await.cart_products.len()
    }

    /// Returns the raw line items of one customer in insertion order.
    pub async fn line_items(&self, customer_id: &CustomerId) -> Vec<CartProduct> {
        self.tables
            .read()
            .await
            .cart_products
            .iter()
            .filter(|line| &line.customer_id == customer_id)
            .map(|line| CartProduct::new(line.product_id.clone(), line.quantity))
            .collect()
    }

    /// Clears all products and line items.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.products.clear();
        tables.cart_products.clear();
    }

    async fn replay(&self, customer_id: &CustomerId, events: &[CartEvent]) -> Result<()> {
        if events.is_empty() {
            tracing::debug!("cart unchanged, nothing to persist");
            return Ok(());
        }

        let fault = self.fail_on_event.write().await.take();
        let mut tables = self.tables.write().await;
        let mut staged = tables.cart_products.clone();

        for (index, event) in events.iter().enumerate() {
            let applied = if fault == Some(index) {
                Err(StoreError::InjectedFault { index })
            } else {
                apply_event(&mut staged, &tables.products, customer_id, event)
            };

            if let Err(e) = applied {
                tracing::warn!(
                    index,
                    event_type = event.event_type(),
                    error = %e,
                    "cart event failed, rolling back"
                );
                return Err(e);
            }
            record_event_applied(event);
        }

        tables.cart_products = staged;
        Ok(())
    }
}

fn apply_event(
    lines: &mut Vec<LineItem>,
    products: &HashMap<ProductId, Product>,
    customer_id: &CustomerId,
    event: &CartEvent,
) -> Result<()> {
    let position = |lines: &[LineItem], product_id: &ProductId| {
        lines
            .iter()
            .position(|line| &line.customer_id == customer_id && &line.product_id == product_id)
    };

    match event {
        CartEvent::AddedProduct { product } => {
            if position(lines, &product.product_id).is_some() {
                return Err(StoreError::Constraint(format!(
                    "duplicate line item ({customer_id}, {})",
                    product.product_id
                )));
            }
            if !products.contains_key(&product.product_id) {
                return Err(StoreError::Constraint(format!(
                    "line item references unknown product {}",
                    product.product_id
                )));
            }
            check_quantity(product)?;
            lines.push(LineItem {
                customer_id: customer_id.clone(),
                product_id: product.product_id.clone(),
                quantity: product.quantity,
            });
        }
        CartEvent::ProductQuantityChanged { product } => {
            check_quantity(product)?;
            match position(lines, &product.product_id) {
                Some(index) => lines[index].quantity = product.quantity,
                None => tracing::warn!(
                    product_id = %product.product_id,
                    "quantity change matched no row, line was removed concurrently"
                ),
            }
        }
        CartEvent::ProductRemoved { product_id } => {
            if let Some(index) = position(lines, product_id) {
                lines.remove(index);
            }
        }
    }

    Ok(())
}

fn check_quantity(product: &CartProduct) -> Result<()> {
    if product.quantity <= 0 {
        return Err(StoreError::Constraint(format!(
            "non-positive quantity {} for {}",
            product.quantity, product.product_id
        )));
    }
    Ok(())
}

#[async_trait]
impl CartRepository for InMemoryCartStore {
    async fn get_by_customer_id(&self, customer_id: &CustomerId) -> Result<CartReadModel> {
        let tables = self.tables.read().await;

        let products = tables
            .cart_products
            .iter()
            .filter(|line| &line.customer_id == customer_id)
            .filter_map(|line| {
                let product = tables.products.get(&line.product_id)?;
                Some(CartReadModelProduct {
                    product_id: line.product_id.clone(),
                    name: product.name.clone(),
                    quantity: line.quantity,
                    price: product.price,
                })
            })
            .collect();

        Ok(CartReadModel::new(customer_id.clone(), products))
    }

    async fn save_cart<F>(&self, customer_id: &CustomerId, update_fn: F) -> Result<()>
    where
        F: FnOnce(Cart) -> std::result::Result<Cart, CartError> + Send,
    {
        let started = Instant::now();
        let result: Result<()> = async {
            // The read lock is released before `update_fn` runs.
            let products = self.line_items(customer_id).await;
            let cart = decide(customer_id, products, update_fn)?;
            self.replay(customer_id, cart.events()).await
        }
        .await;

        record_save(started, &result);
        result
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCartStore {
    async fn create_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(&product.id) {
            Some(existing) => {
                existing.name = product.name;
                existing.price = product.price;
                existing.quantity = product.quantity;
                existing.updated_at = product.updated_at;
            }
            None => {
                tables.products.insert(product.id.clone(), product);
            }
        }
        Ok(())
    }

    async fn get_product_by_id(&self, product_id: &ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(product_id).cloned())
    }

    async fn delete_product(&self, product_id: &ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let existed = tables.products.remove(product_id).is_some();
        tables
            .cart_products
            .retain(|line| &line.product_id != product_id);
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    async fn store_with_products(ids: &[&str]) -> InMemoryCartStore {
        let store = InMemoryCartStore::new();
        for id in ids {
            store
                .create_product(Product::new(*id, format!("name-{id}"), Decimal::new(100, 2), 10))
                .await
                .unwrap();
        }
        store
    }

    fn set(
        product_id: &str,
        quantity: i32,
    ) -> impl FnOnce(Cart) -> std::result::Result<Cart, CartError> + Send {
        let target = CartProduct::new(product_id, quantity);
        move |cart| cart.update_products_in_cart(target)
    }

    #[tokio::test]
    async fn save_inserts_updates_and_deletes() {
        let store = store_with_products(&["a", "b"]).await;
        let customer = CustomerId::new("c1");

        store.save_cart(&customer, set("a", 1)).await.unwrap();
        store.save_cart(&customer, set("b", 2)).await.unwrap();
        store.save_cart(&customer, set("a", 5)).await.unwrap();
        assert_eq!(
            store.line_items(&customer).await,
            vec![CartProduct::new("a", 5), CartProduct::new("b", 2)]
        );

        store.save_cart(&customer, set("a", 0)).await.unwrap();
        assert_eq!(
            store.line_items(&customer).await,
            vec![CartProduct::new("b", 2)]
        );
    }

    #[tokio::test]
    async fn unknown_product_violates_reference() {
        let store = store_with_products(&[]).await;
        let result = store.save_cart(&CustomerId::new("c1"), set("ghost", 1)).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
        assert_eq!(store.line_count().await, 0);
    }

    #[tokio::test]
    async fn injected_fault_is_consumed_once() {
        let store = store_with_products(&["a"]).await;
        let customer = CustomerId::new("c1");

        store.fail_on_event(0).await;
        let result = store.save_cart(&customer, set("a", 1)).await;
        assert!(matches!(result, Err(StoreError::InjectedFault { index: 0 })));
        assert_eq!(store.line_count().await, 0);

        store.save_cart(&customer, set("a", 1)).await.unwrap();
        assert_eq!(store.line_count().await, 1);
    }

    #[tokio::test]
    async fn lines_are_isolated_per_customer() {
        let store = store_with_products(&["a"]).await;

        store.save_cart(&CustomerId::new("c1"), set("a", 1)).await.unwrap();
        store.save_cart(&CustomerId::new("c2"), set("a", 4)).await.unwrap();

        assert_eq!(
            store.line_items(&CustomerId::new("c1")).await,
            vec![CartProduct::new("a", 1)]
        );
        assert_eq!(
            store.line_items(&CustomerId::new("c2")).await,
            vec![CartProduct::new("a", 4)]
        );
    }

    #[tokio::test]
    async fn deleting_product_removes_its_lines() {
        let store = store_with_products(&["a", "b"]).await;
        let customer = CustomerId::new("c1");
        store.save_cart(&customer, set("a", 1)).await.unwrap();
        store.save_cart(&customer, set("b", 1)).await.unwrap();

        assert!(store.delete_product(&ProductId::new("a")).await.unwrap());
        assert!(!store.delete_product(&ProductId::new("a")).await.unwrap());
        assert_eq!(
            store.line_items(&customer).await,
            vec![CartProduct::new("b", 1)]
        );
    }

    #[tokio::test]
    async fn create_product_upserts() {
        let store = store_with_products(&["a"]).await;
        store
            .create_product(Product::new("a", "renamed", Decimal::new(250, 2), 3))
            .await
            .unwrap();

        let product = store
            .get_product_by_id(&ProductId::new("a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.name, "renamed");
        assert_eq!(product.price, Decimal::new(250, 2));
        assert!(
            store
                .get_product_by_id(&ProductId::new("missing"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
