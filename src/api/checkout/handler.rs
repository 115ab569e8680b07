//! Checkout API Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::{created, ok, ApiJson, AppResponse, AppResult};
use crate::api::AppState;
use crate::checkout::{CheckoutReceipt, CheckoutRequest, Quote, QuoteRequest};

/// POST /api/checkout/quote - Price a cart without placing it
pub async fn quote(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<QuoteRequest>,
) -> AppResult<Json<AppResponse<Quote>>> {
    Ok(ok(state.checkout.quote(req).await?))
}

/// POST /api/checkout - Place the order and settle loyalty points
pub async fn place_order(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<CheckoutReceipt>>)> {
    let receipt = state.checkout.place_order(req).await?;
    Ok(created(receipt))
}
