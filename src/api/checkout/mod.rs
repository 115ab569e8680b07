//! Checkout API Module

mod handler;

use axum::routing::post;
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(handler::place_order))
        .route("/api/checkout/quote", post(handler::quote))
}
