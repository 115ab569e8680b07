//! HTTP surface under `/api`.
//!
//! # Structure
//!
//! - [`orders`] - order batches, status, cancel, assignment
//! - [`loyalty`] - balances and manual point adjustments
//! - [`checkout`] - quote and place order
//! - [`products`] - catalog
//! - [`staff`] - delivery rider roster
//! - [`feedback`] - customer feedback
//! - [`admin`] - dashboard reports
//! - [`health`] - liveness

pub mod auth;
pub mod error;

pub mod admin;
pub mod checkout;
pub mod feedback;
pub mod health;
pub mod loyalty;
pub mod orders;
pub mod products;
pub mod staff;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_system::StorefrontSystem;
use crate::checkout::CheckoutClient;
use crate::clients::{FeedbackClient, LoyaltyClient, OrderClient, ProductClient, StaffClient};
use crate::dispatch::DispatchClient;

/// Shared handler state: cheap clones of every client.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderClient,
    pub loyalty: LoyaltyClient,
    pub products: ProductClient,
    pub staff: StaffClient,
    pub feedback: FeedbackClient,
    pub checkout: CheckoutClient,
    pub dispatch: DispatchClient,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(system: &StorefrontSystem, admin_token: Option<String>) -> Self {
        Self {
            orders: system.orders.clone(),
            loyalty: system.loyalty.clone(),
            products: system.products.clone(),
            staff: system.staff.clone(),
            feedback: system.feedback.clone(),
            checkout: system.checkout.clone(),
            dispatch: system.dispatch.clone(),
            admin_token: admin_token.map(Arc::from),
        }
    }
}

/// Build a router with all routes registered (no middleware)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(orders::router())
        .merge(loyalty::router())
        .merge(checkout::router())
        .merge(products::router())
        .merge(staff::router())
        .merge(feedback::router())
        .merge(admin::router())
        .merge(health::router())
}

/// Build the fully layered application.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
