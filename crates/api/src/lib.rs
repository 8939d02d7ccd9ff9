//! HTTP API server with observability for the cart service.
//!
//! Provides REST endpoints for the authenticated customer's cart and for
//! maintaining the local product catalog, with structured logging (tracing)
//! and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use cart_store::{CartRepository, CartService, CatalogRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R>(state: Arc<AppState<R>>, metrics_handle: PrometheusHandle) -> Router
where
    R: CartRepository + CatalogRepository + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get::<R>))
        .route("/cart/products", put(routes::cart::update_products::<R>))
        .route("/products", post(routes::products::create::<R>))
        .route("/products/{id}", delete(routes::products::delete::<R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a cart repository.
pub fn create_default_state<R>(repository: R) -> Arc<AppState<R>>
where
    R: CartRepository + CatalogRepository + 'static,
{
    Arc::new(AppState {
        cart_service: CartService::new(repository),
    })
}
