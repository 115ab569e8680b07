use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::auth::AdminGuard;
use crate::api::error::{ok, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{OrderFilter, TimeWindow};
use crate::reports::{customer_summaries, dashboard_stats, CustomerSummary, DashboardStats};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    window: Option<TimeWindow>,
}

/// GET /api/admin/stats - Dashboard numbers, optionally for a recent window
pub async fn stats(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<AppResponse<DashboardStats>>> {
    let filter = OrderFilter { since: query.window.map(|w| w.since(Utc::now())), ..Default::default() };
    let orders = state.orders.list_orders(filter).await?;
    Ok(ok(dashboard_stats(&orders)))
}

/// GET /api/admin/customers - Customers grouped by phone
pub async fn customers(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> AppResult<Json<AppResponse<Vec<CustomerSummary>>>> {
    let orders = state.orders.list_orders(OrderFilter::default()).await?;
    Ok(ok(customer_summaries(&orders)))
}
