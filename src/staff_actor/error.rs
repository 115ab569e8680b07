use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StaffError {
    #[error("Staff member not found: {0}")]
    NotFound(String),
    #[error("Staff validation error: {0}")]
    ValidationError(String),
    #[error("Staff member unavailable: {0}")]
    Unavailable(String),
    #[error("Staff storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<StaffError>> for StaffError {
    fn from(e: FrameworkError<StaffError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => StaffError::NotFound(id),
            FrameworkError::Storage(msg) => StaffError::StorageError(msg),
            FrameworkError::Entity(e) => e,
            other => StaffError::ActorCommunicationError(other.to_string()),
        }
    }
}
