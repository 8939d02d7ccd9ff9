use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, ProductId};
use domain::{
    Cart, CartError, CartEvent, CartProduct, CartReadModel, CartReadModelProduct, DomainEvent,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{
    Product, Result, StoreError,
    store::{CartRepository, CatalogRepository, decide, record_event_applied, record_save},
};

/// PostgreSQL-backed cart store.
///
/// Line items live in `cart_products`, keyed by `(customer_id, product_id)`.
/// Catalog data lives in `products`.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartProductRow {
    product_id: String,
    quantity: i32,
}

impl From<CartProductRow> for CartProduct {
    fn from(row: CartProductRow) -> Self {
        CartProduct::new(row.product_id, row.quantity)
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: String,
    name: String,
    quantity: i32,
    price: Decimal,
}

impl From<CartLineRow> for CartReadModelProduct {
    fn from(row: CartLineRow) -> Self {
        CartReadModelProduct {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_line_items(&self, customer_id: &CustomerId) -> Result<Vec<CartProduct>> {
        let rows: Vec<CartProductRow> = sqlx::query_as(
            r#"
            SELECT product_id, quantity
            FROM cart_products
            WHERE customer_id = $1
            ORDER BY created_at ASC, product_id ASC
            "#,
        )
        .bind(customer_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::database("load cart products"))?;

        Ok(rows.into_iter().map(CartProduct::from).collect())
    }

    /// Translates one cart event into its SQL statement.
    async fn apply_event(
        conn: &mut PgConnection,
        customer_id: &CustomerId,
        event: &CartEvent,
    ) -> Result<()> {
        match event {
            CartEvent::AddedProduct { product } => {
                sqlx::query(
                    r#"
                    INSERT INTO cart_products (customer_id, product_id, quantity, created_at, updated_at)
                    VALUES ($1, $2, $3, clock_timestamp(), clock_timestamp())
                    "#,
                )
                .bind(customer_id.as_str())
                .bind(product.product_id.as_str())
                .bind(product.quantity)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::database("insert cart product"))?;
            }
            CartEvent::ProductQuantityChanged { product } => {
                let result = sqlx::query(
                    r#"
                    UPDATE cart_products
                    SET quantity = $3, updated_at = clock_timestamp()
                    WHERE customer_id = $1 AND product_id = $2
                    "#,
                )
                .bind(customer_id.as_str())
                .bind(product.product_id.as_str())
                .bind(product.quantity)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::database("update cart product"))?;

                if result.rows_affected() == 0 {
                    tracing::warn!(
                        product_id = %product.product_id,
                        "quantity change matched no row, line was removed concurrently"
                    );
                }
            }
            CartEvent::ProductRemoved { product_id } => {
                sqlx::query("DELETE FROM cart_products WHERE customer_id = $1 AND product_id = $2")
                    .bind(customer_id.as_str())
                    .bind(product_id.as_str())
                    .execute(&mut *conn)
                    .await
                    .map_err(StoreError::database("delete cart product"))?;
            }
        }

        Ok(())
    }

    /// Applies the events in order inside one transaction.
    async fn replay(&self, customer_id: &CustomerId, events: &[CartEvent]) -> Result<()> {
        if events.is_empty() {
            tracing::debug!("cart unchanged, nothing to persist");
            return Ok(());
        }

        // Dropping `tx` without commit (error or cancelled future) rolls back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::database("begin transaction"))?;

        for (index, event) in events.iter().enumerate() {
            if let Err(e) = Self::apply_event(&mut tx, customer_id, event).await {
                tracing::warn!(
                    index,
                    event_type = event.event_type(),
                    error = %e,
                    "cart event failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "failed to roll back cart transaction");
                }
                return Err(e);
            }
            record_event_applied(event);
        }

        tx.commit()
            .await
            .map_err(StoreError::database("commit transaction"))?;

        tracing::debug!(events = events.len(), "cart saved");
        Ok(())
    }
}

#[async_trait]
impl CartRepository for PostgresCartStore {
    #[tracing::instrument(skip_all, fields(customer_id = %customer_id))]
    async fn get_by_customer_id(&self, customer_id: &CustomerId) -> Result<CartReadModel> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r#"
            SELECT cp.product_id, p.name, cp.quantity, p.price
            FROM cart_products AS cp
            JOIN products AS p ON p.id = cp.product_id
            WHERE cp.customer_id = $1
            ORDER BY cp.created_at ASC, cp.product_id ASC
            "#,
        )
        .bind(customer_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::database("select cart"))?;

        let products = rows.into_iter().map(CartReadModelProduct::from).collect();
        Ok(CartReadModel::new(customer_id.clone(), products))
    }

    #[tracing::instrument(skip_all, fields(customer_id = %customer_id))]
    async fn save_cart<F>(&self, customer_id: &CustomerId, update_fn: F) -> Result<()>
    where
        F: FnOnce(Cart) -> std::result::Result<Cart, CartError> + Send,
    {
        let started = Instant::now();
        let result: Result<()> = async {
            let products = self.load_line_items(customer_id).await?;
            let cart = decide(customer_id, products, update_fn)?;
            self.replay(customer_id, cart.events()).await
        }
        .await;

        record_save(started, &result);
        result
    }
}

#[async_trait]
impl CatalogRepository for PostgresCartStore {
    #[tracing::instrument(skip_all, fields(product_id = %product.id))]
    async fn create_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                quantity = EXCLUDED.quantity,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::database("insert product"))?;

        Ok(())
    }

    async fn get_product_by_id(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, quantity, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::database("select product"))?;

        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip_all, fields(product_id = %product_id))]
    async fn delete_product(&self, product_id: &ProductId) -> Result<bool> {
        // cart_products rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::database("delete product"))?;

        Ok(result.rows_affected() > 0)
    }
}
