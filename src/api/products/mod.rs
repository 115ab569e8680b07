//! Product API Module
//!
//! Catalog reads are public; changes require the admin token.

mod handler;

use axum::routing::{get, put};
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update).delete(handler::delete))
        .route("/{id}/stock", put(handler::set_stock))
}
