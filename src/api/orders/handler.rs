//! Order API Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::auth::AdminGuard;
use crate::api::error::{created, ok, ApiJson, AppError, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{
    CustomerDetails, LineItemCreate, Order, OrderCreate, OrderFilter, OrderId, OrderLineView, OrderStatus,
    PaymentMode, PaymentStatus, TimeWindow,
};

/// Path ids that are not order ids cannot name an order.
fn parse_order_id(raw: &str) -> AppResult<OrderId> {
    OrderId::parse(raw).ok_or_else(|| AppError::NotFound(format!("Order {raw} not found")))
}

/// Money is kept to the cent.
const MONEY_SCALE: u32 = 2;

/// Splits a posted line total into its unit price.
fn unit_price(total_price: Decimal, quantity: u32) -> AppResult<Decimal> {
    let unit = (total_price / Decimal::from(quantity)).normalize();
    if unit.scale() > MONEY_SCALE {
        return Err(AppError::Validation(format!(
            "totalPrice {total_price} does not split into {quantity} equal unit prices"
        )));
    }
    Ok(unit)
}

/// Listing filters shared by the flat and grouped views.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    status: Option<OrderStatus>,
    payment_mode: Option<PaymentMode>,
    /// `paid` (online) or `unpaid` (cash), as the admin screen labels them.
    payment: Option<String>,
    window: Option<TimeWindow>,
    /// RFC 3339 bounds for a custom range; `until` is exclusive.
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    search: Option<String>,
}

impl OrderQuery {
    fn into_filter(self) -> AppResult<OrderFilter> {
        let payment = match self.payment.as_deref() {
            None | Some("") | Some("all") => None,
            Some("paid") => Some(PaymentMode::Online),
            Some("unpaid") => Some(PaymentMode::Cash),
            Some(other) => return Err(AppError::Validation(format!("unknown payment filter '{other}'"))),
        };
        let payment_mode = match (self.payment_mode, payment) {
            (Some(a), Some(b)) if a != b => {
                return Err(AppError::Validation("paymentMode and payment filters disagree".to_string()))
            }
            (mode, payment) => mode.or(payment),
        };
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if until <= since {
                return Err(AppError::Validation("until must be later than since".to_string()));
            }
        }
        let window_start = self.window.map(|w| w.since(Utc::now()));
        Ok(OrderFilter {
            since: window_start.max(self.since),
            until: self.until,
            payment_mode,
            status: self.status,
            search: self.search,
        })
    }
}

/// One line in the storefront's per-line wire format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(flatten)]
    customer: CustomerDetails,
    product_id: String,
    product_name: String,
    /// Signed so that negative values reach validation instead of failing to parse.
    quantity: i64,
    /// Line total, i.e. unit price times quantity.
    total_price: Decimal,
    payment_mode: PaymentMode,
    payment_status: PaymentStatus,
    #[serde(default)]
    payment_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(flatten)]
    order: OrderCreate,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    staff_id: String,
}

/// An order batch with its derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    order: Order,
    total: Decimal,
    units: u64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self { total: order.total(), units: order.units(), order }
    }
}

/// POST /api/orders - Add one line, creating the order on its first line
pub async fn create_line(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LineRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<OrderLineView>>)> {
    let quantity = u32::try_from(req.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::Validation("quantity must be at least 1".to_string()))?;
    let line = LineItemCreate {
        unit_price: unit_price(req.total_price, quantity)?,
        product_id: req.product_id,
        product_name: req.product_name,
        quantity,
    };
    let product_id = line.product_id.clone();
    let params = OrderCreate {
        customer: req.customer,
        payment_mode: req.payment_mode,
        payment_status: req.payment_status,
        payment_reference: req.payment_reference,
        lines: vec![line],
    };

    let order = match req.order_id {
        Some(order_id) => state.orders.append_line(order_id, params).await?,
        None => {
            let order_id = state.orders.create_order(None, params).await?;
            state.orders.get_order(order_id).await?
        }
    };
    let view = order
        .line_views()
        .into_iter()
        .find(|line| line.product_id == product_id)
        .ok_or_else(|| AppError::Internal(format!("line for {product_id} missing after insert")))?;
    Ok(created(view))
}

/// POST /api/orders/batch - Create every line of an order at once
pub async fn create_batch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<OrderView>>)> {
    let order_id = state.orders.create_order(req.order_id, req.order).await?;
    let order = state.orders.get_order(order_id).await?;
    Ok(created(order.into()))
}

/// GET /api/orders - Every line item, newest order first
pub async fn list_lines(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<AppResponse<Vec<OrderLineView>>>> {
    let orders = state.orders.list_orders(query.into_filter()?).await?;
    Ok(ok(orders.iter().flat_map(Order::line_views).collect()))
}

/// GET /api/orders/groups - Orders aggregated by id
pub async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let orders = state.orders.list_orders(query.into_filter()?).await?;
    Ok(ok(orders.into_iter().map(OrderView::from).collect()))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.orders.get_order(parse_order_id(&id)?).await?;
    Ok(ok(order.into()))
}

/// PUT /api/orders/{id}/status - Move every line of the order forward
pub async fn update_status(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.dispatch.update_status(parse_order_id(&id)?, req.status).await?;
    Ok(ok(order.into()))
}

/// POST /api/orders/{id}/cancel - Customer cancel while still received
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.orders.cancel_order(parse_order_id(&id)?).await?;
    Ok(ok(order.into()))
}

/// POST /api/orders/{id}/assign - Hand the order to a delivery rider
pub async fn assign(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AssignRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.dispatch.assign(parse_order_id(&id)?, req.staff_id).await?;
    Ok(ok(order.into()))
}

/// DELETE /api/orders/{id} - Admin delete in any state
pub async fn delete(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.dispatch.delete_order(parse_order_id(&id)?).await?;
    Ok(ok(order.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_price_drops_trailing_scale() {
        assert_eq!(unit_price(Decimal::from(178), 2).unwrap().to_string(), "89");
        assert_eq!(unit_price(Decimal::new(17900, 2), 2).unwrap().to_string(), "89.5");
        assert_eq!(unit_price(Decimal::from(100), 8).unwrap().to_string(), "12.5");
    }

    #[test]
    fn uneven_total_is_rejected() {
        assert!(matches!(unit_price(Decimal::from(100), 7), Err(AppError::Validation(_))));
        assert!(matches!(unit_price(Decimal::from(100), 3), Err(AppError::Validation(_))));
    }

    #[test]
    fn window_and_since_take_the_later_bound() {
        let since = Utc::now() - chrono::Duration::days(2);
        let query = OrderQuery { window: Some(TimeWindow::Year), since: Some(since), ..Default::default() };
        assert_eq!(query.into_filter().unwrap().since, Some(since));

        let reversed = OrderQuery { since: Some(since), until: Some(since), ..Default::default() };
        assert!(matches!(reversed.into_filter(), Err(AppError::Validation(_))));
    }
}
