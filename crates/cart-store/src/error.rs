use common::ProductId;
use domain::CartError;
use thiserror::Error;

/// Errors that can occur when reading or saving carts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cart could not be built from the loaded line items.
    #[error("Invalid cart: {0}")]
    Cart(#[source] CartError),

    /// The caller's update function refused the change.
    /// Nothing was written.
    #[error("Cart update rejected: {0}")]
    UpdateRejected(#[source] CartError),

    /// The product is not in the local catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A database error occurred.
    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A key or reference constraint was violated (in-memory store only).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A failure injected into the in-memory store for testing.
    #[error("Injected fault while applying event {index}")]
    InjectedFault { index: usize },
}

impl StoreError {
    /// Returns a closure wrapping a sqlx error with the failed operation.
    pub(crate) fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Database { operation, source }
    }

    /// Returns true if the error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StoreError::Cart(_) | StoreError::UpdateRejected(_))
    }
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
