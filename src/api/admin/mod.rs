//! Admin report API Module

mod handler;

use axum::routing::get;
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(handler::stats))
        .route("/api/admin/customers", get(handler::customers))
}
