//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Cart store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(err) => store_error_status(err),
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Store(StoreError::Cart(err) | StoreError::UpdateRejected(err)) => {
                Some(err.code())
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = match self.code() {
            Some(code) => serde_json::json!({ "error": message, "code": code }),
            None => serde_json::json!({ "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Cart(_) | StoreError::UpdateRejected(_) => StatusCode::BAD_REQUEST,
        StoreError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Database { .. }
        | StoreError::Migration(_)
        | StoreError::Constraint(_)
        | StoreError::InjectedFault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
