use chrono::Utc;

use super::error::FeedbackError;
use crate::actor_framework::Entity;
use crate::domain::{Feedback, FeedbackCreate};

const MAX_RATING: u8 = 5;

impl Entity for Feedback {
    type Id = String;
    type CreateParams = FeedbackCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = FeedbackError;

    fn id(&self) -> &String { &self.id }

    fn from_create_params(id: String, params: FeedbackCreate) -> Result<Self, FeedbackError> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(FeedbackError::ValidationError("name is required".to_string()));
        }
        if !(1..=MAX_RATING).contains(&params.rating) {
            return Err(FeedbackError::ValidationError(format!(
                "rating must be between 1 and {MAX_RATING}"
            )));
        }
        let message = params.message.trim().to_string();
        if message.is_empty() {
            return Err(FeedbackError::ValidationError("message is required".to_string()));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            name,
            email: params.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()),
            rating: params.rating,
            message,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FeedbackError> {
        Err(FeedbackError::Immutable)
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FeedbackError> {
        Err(FeedbackError::Immutable)
    }
}
