//! Cart service providing a simplified API for cart operations.

use common::{CustomerId, ProductId};
use domain::{CartProduct, CartReadModel};

use crate::{CartRepository, CatalogRepository, Product, Result, StoreError};

/// Service for managing carts and the local product catalog.
///
/// Wraps a repository and checks requests against the catalog before any
/// cart change is persisted.
pub struct CartService<R> {
    repository: R,
}

impl<R> CartService<R>
where
    R: CartRepository + CatalogRepository,
{
    /// Creates a new cart service backed by the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Sets the quantity of one product in a customer's cart.
    ///
    /// A quantity of zero or less removes the line. A positive quantity
    /// requires the product to exist in the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn update_products_in_cart(
        &self,
        customer_id: &CustomerId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<()> {
        if customer_id.is_empty() {
            return Err(StoreError::Cart(domain::CartError::InvalidCustomerId));
        }

        if quantity > 0 && self.repository.get_product_by_id(&product_id).await?.is_none() {
            return Err(StoreError::ProductNotFound(product_id));
        }

        let target = CartProduct::new(product_id, quantity);
        self.repository
            .save_cart(customer_id, move |cart| cart.update_products_in_cart(target))
            .await
    }

    /// Returns the priced view of a customer's cart.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, customer_id: &CustomerId) -> Result<CartReadModel> {
        if customer_id.is_empty() {
            return Err(StoreError::Cart(domain::CartError::InvalidCustomerId));
        }
        self.repository.get_by_customer_id(customer_id).await
    }

    /// Adds a product to the catalog or replaces an existing one.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: Product) -> Result<()> {
        self.repository.create_product(product).await
    }

    /// Removes a product from the catalog along with every cart line holding it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<()> {
        if self.repository.delete_product(product_id).await? {
            Ok(())
        } else {
            Err(StoreError::ProductNotFound(product_id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::InMemoryCartStore;

    async fn service() -> CartService<InMemoryCartStore> {
        let service = CartService::new(InMemoryCartStore::new());
        service
            .create_product(Product::new("P1", "apple", Decimal::new(1055, 2), 100))
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn adds_and_prices_product() {
        let service = service().await;
        let customer = CustomerId::new("c1");

        service
            .update_products_in_cart(&customer, ProductId::new("P1"), 2)
            .await
            .unwrap();

        let cart = service.get_cart(&customer).await.unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_price(), Decimal::new(2110, 2));
    }

    #[tokio::test]
    async fn rejects_unknown_product() {
        let service = service().await;
        let result = service
            .update_products_in_cart(&CustomerId::new("c1"), ProductId::new("nope"), 1)
            .await;
        assert!(matches!(result, Err(StoreError::ProductNotFound(id)) if id.as_str() == "nope"));
    }

    #[tokio::test]
    async fn removing_unknown_product_is_a_no_op() {
        let service = service().await;
        let customer = CustomerId::new("c1");

        service
            .update_products_in_cart(&customer, ProductId::new("nope"), 0)
            .await
            .unwrap();
        assert!(service.get_cart(&customer).await.unwrap().products().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_customer() {
        let service = service().await;
        let result = service
            .update_products_in_cart(&CustomerId::new(""), ProductId::new("P1"), 1)
            .await;
        assert!(matches!(result, Err(StoreError::Cart(_))));
        assert!(service.get_cart(&CustomerId::new("")).await.is_err());
    }

    #[tokio::test]
    async fn delete_reports_missing_product() {
        let service = service().await;
        service.delete_product(&ProductId::new("P1")).await.unwrap();
        let result = service.delete_product(&ProductId::new("P1")).await;
        assert!(matches!(result, Err(StoreError::ProductNotFound(_))));
    }
}
