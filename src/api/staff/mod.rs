//! Delivery staff API Module (admin only)

mod handler;

use axum::routing::{get, post, put};
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/toggle", post(handler::toggle))
}
