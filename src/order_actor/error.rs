use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order has no line items")]
    EmptyCart,
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid order state: {0}")]
    InvalidState(String),
    #[error("Order conflict: {0}")]
    Conflict(String),
    #[error("Order batch was not stored and has been rolled back: {0}")]
    PartialBatch(String),
    #[error("Order storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(e: FrameworkError<OrderError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => OrderError::Conflict(format!("order {id} already exists")),
            FrameworkError::Storage(msg) => OrderError::StorageError(msg),
            FrameworkError::Entity(e) => e,
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
