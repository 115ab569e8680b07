//! Loyalty API Module
//!
//! Reads are public. Manual point adjustments are admin-only; customer
//! accrual and redemption happen inside checkout.

mod handler;

use axum::routing::{get, post};
use axum::Router;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/loyalty", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/points/{email}", get(handler::get_points))
        .route("/accounts/{email}", get(handler::get_account))
        .route("/add-points", post(handler::add_points))
        .route("/redeem-points", post(handler::redeem_points))
}
