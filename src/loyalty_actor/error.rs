use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during loyalty ledger operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoyaltyError {
    #[error("Loyalty validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient points: requested {requested}, available {available}")]
    InsufficientPoints { requested: u64, available: u64 },
    #[error("Invalid ledger operation: {0}")]
    InvalidState(String),
    #[error("Loyalty storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<LoyaltyError>> for LoyaltyError {
    fn from(e: FrameworkError<LoyaltyError>) -> Self {
        match e {
            FrameworkError::Storage(msg) => LoyaltyError::StorageError(msg),
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(key) | FrameworkError::AlreadyExists(key) => {
                LoyaltyError::InvalidState(format!("unexpected account lookup failure for {key}"))
            }
            other => LoyaltyError::ActorCommunicationError(other.to_string()),
        }
    }
}
