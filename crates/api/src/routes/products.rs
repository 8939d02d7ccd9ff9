//! Catalog maintenance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::{CartRepository, CatalogRepository, Product};
use common::ProductId;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
}

impl CreateProductRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.id.is_empty() {
            return Err(ApiError::BadRequest("id is required".to_string()));
        }
        if self.name.is_empty() {
            return Err(ApiError::BadRequest("name is required".to_string()));
        }
        if self.price.is_sign_negative() {
            return Err(ApiError::BadRequest(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        // The catalog column holds cents; finer prices would be rounded on write.
        if self.price.scale() > 2 {
            return Err(ApiError::BadRequest(format!(
                "price must have at most 2 decimal places, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// POST /products: insert or replace a catalog product.
#[tracing::instrument(skip(state, req), fields(product_id = %req.id))]
pub async fn create<R>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError>
where
    R: CartRepository + CatalogRepository + 'static,
{
    req.validate()?;

    let product = Product::new(req.id, req.name, req.price, req.quantity);
    state.cart_service.create_product(product.clone()).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// DELETE /products/{id}: remove a product and its cart lines.
#[tracing::instrument(skip(state))]
pub async fn delete<R>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: CartRepository + CatalogRepository + 'static,
{
    state
        .cart_service
        .delete_product(&ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            id: "P1".to_string(),
            name: "apple".to_string(),
            price,
            quantity: 1,
        }
    }

    #[test]
    fn accepts_whole_cents() {
        assert!(request(Decimal::new(1055, 2)).validate().is_ok());
        assert!(request(Decimal::new(10, 0)).validate().is_ok());
    }

    #[test]
    fn rejects_sub_cent_price() {
        let err = request(Decimal::new(125, 3)).validate().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("2 decimal places")));
    }

    #[test]
    fn rejects_negative_price() {
        assert!(request(Decimal::new(-1, 0)).validate().is_err());
    }
}
