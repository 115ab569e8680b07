//! Feedback API Module
//!
//! Anyone may rate an order once. Reading and deleting feedback is for admins.

mod handler;

use axum::routing::{delete, get};
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/feedback", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::submit))
        .route("/summary", get(handler::summary))
        .route("/{id}", delete(handler::delete))
}
