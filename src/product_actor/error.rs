use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock { product: String, requested: u32, available: u32 },
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Product storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(e: FrameworkError<ProductError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Storage(msg) => ProductError::StorageError(msg),
            FrameworkError::Entity(e) => e,
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
