//! Cart endpoints for the authenticated customer.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cart_store::{CartRepository, CatalogRepository};
use common::ProductId;
use domain::CartReadModel;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::Customer;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartProductRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// PUT /cart/products: set the quantity of one product, 0 removes it.
#[tracing::instrument(skip(state, customer, req), fields(customer_id = %customer.0))]
pub async fn update_products<R>(
    State(state): State<Arc<AppState<R>>>,
    customer: Customer,
    Json(req): Json<UpdateCartProductRequest>,
) -> Result<Json<StatusResponse>, ApiError>
where
    R: CartRepository + CatalogRepository + 'static,
{
    if req.quantity < 0 {
        return Err(ApiError::BadRequest(format!(
            "quantity must be zero or greater, got {}",
            req.quantity
        )));
    }
    if req.product_id.is_empty() {
        return Err(ApiError::BadRequest("productId is required".to_string()));
    }

    state
        .cart_service
        .update_products_in_cart(&customer.0, ProductId::new(req.product_id), req.quantity)
        .await?;

    Ok(Json(StatusResponse { status: "ok" }))
}

/// GET /cart: the customer's cart priced against the catalog.
#[tracing::instrument(skip(state, customer), fields(customer_id = %customer.0))]
pub async fn get<R>(
    State(state): State<Arc<AppState<R>>>,
    customer: Customer,
) -> Result<Json<CartReadModel>, ApiError>
where
    R: CartRepository + CatalogRepository + 'static,
{
    let cart = state.cart_service.get_cart(&customer.0).await?;
    Ok(Json(cart))
}
