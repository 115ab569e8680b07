//! Loyalty API Handlers

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::auth::AdminGuard;
use crate::api::error::{ok, ApiJson, AppError, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{CustomerKey, LedgerReceipt, LoyaltySummary, OrderId};

fn customer_key(email: &str) -> AppResult<CustomerKey> {
    CustomerKey::parse(email).ok_or_else(|| AppError::Validation(format!("invalid email '{email}'")))
}

/// Point amounts arrive signed so negatives are reported, not rejected by the parser.
fn points(raw: i64) -> AppResult<u64> {
    u64::try_from(raw).map_err(|_| AppError::Validation("points must not be negative".to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    loyalty_points: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    loyalty_points: u64,
    points: u64,
    replayed: bool,
}

impl From<LedgerReceipt> for LedgerResponse {
    fn from(receipt: LedgerReceipt) -> Self {
        Self { loyalty_points: receipt.balance, points: receipt.points, replayed: receipt.replayed }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPointsRequest {
    email: String,
    points: i64,
    #[serde(default)]
    order_id: Option<OrderId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPointsRequest {
    email: String,
    points: i64,
    order_subtotal: Decimal,
    #[serde(default)]
    order_id: Option<OrderId>,
}

/// GET /api/loyalty/points/{email}
pub async fn get_points(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<AppResponse<PointsResponse>>> {
    let balance = state.loyalty.get_balance(customer_key(&email)?).await?;
    Ok(ok(PointsResponse { loyalty_points: balance }))
}

/// GET /api/loyalty/accounts/{email} - Balance, totals and ledger entries
pub async fn get_account(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<AppResponse<LoyaltySummary>>> {
    let summary = state.loyalty.get_summary(customer_key(&email)?).await?;
    Ok(ok(summary))
}

/// POST /api/loyalty/add-points
pub async fn add_points(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddPointsRequest>,
) -> AppResult<Json<AppResponse<LedgerResponse>>> {
    let receipt = state
        .loyalty
        .accrue(customer_key(&req.email)?, points(req.points)?, req.order_id)
        .await?;
    Ok(ok(receipt.into()))
}

/// POST /api/loyalty/redeem-points
pub async fn redeem_points(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RedeemPointsRequest>,
) -> AppResult<Json<AppResponse<LedgerResponse>>> {
    let receipt = state
        .loyalty
        .redeem(customer_key(&req.email)?, points(req.points)?, req.order_subtotal, req.order_id)
        .await?;
    Ok(ok(receipt.into()))
}
