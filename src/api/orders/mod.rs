//! Order API Module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST (one line) / GET (flat lines) | - |
//! | /api/orders/batch | POST | - |
//! | /api/orders/groups | GET | - |
//! | /api/orders/{id} | GET / DELETE | DELETE: admin |
//! | /api/orders/{id}/status | PUT | admin |
//! | /api/orders/{id}/cancel | POST | - |
//! | /api/orders/{id}/assign | POST | admin |

mod handler;

use axum::routing::{get, post, put};
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_lines).post(handler::create_line))
        .route("/batch", post(handler::create_batch))
        .route("/groups", get(handler::list_groups))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/assign", post(handler::assign))
}
