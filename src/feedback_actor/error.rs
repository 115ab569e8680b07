use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedbackError {
    #[error("Feedback not found: {0}")]
    NotFound(String),
    #[error("Feedback validation error: {0}")]
    ValidationError(String),
    #[error("Feedback cannot be edited")]
    Immutable,
    #[error("Feedback for order {0} was already submitted")]
    AlreadySubmitted(String),
    #[error("Feedback storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<FeedbackError>> for FeedbackError {
    fn from(e: FrameworkError<FeedbackError>) -> Self {
        match e {
            FrameworkError::NotFound(id) => FeedbackError::NotFound(id),
            FrameworkError::Storage(msg) => FeedbackError::StorageError(msg),
            FrameworkError::Entity(e) => e,
            other => FeedbackError::ActorCommunicationError(other.to_string()),
        }
    }
}
