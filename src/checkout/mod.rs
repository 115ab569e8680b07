//! Checkout: prices a cart against the catalog, places the order and moves
//! loyalty points for it.

mod error;
mod quote;

pub use error::*;
pub use quote::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::clients::{LoyaltyClient, OrderClient, ProductClient};
use crate::domain::{
    CustomerDetails, CustomerKey, LineItemCreate, Order, OrderCreate, OrderId, PaymentMode, PaymentStatus,
};
use crate::order_actor::{validate_create, OrderError};
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub redeem_points: bool,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Set by clients that retry; the same id and cart place the order once.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub redeem_points: bool,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order: Order,
    pub quote: Quote,
    pub points_redeemed: u64,
    pub points_earned: u64,
    /// `None` for anonymous checkouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty_balance: Option<u64>,
    pub replayed: bool,
}

/// Composes the order, loyalty and catalog clients.
///
/// The actors involved do not share a transaction; a failure after the order
/// exists is undone with compensating calls.
#[derive(Clone)]
pub struct CheckoutClient {
    orders: OrderClient,
    loyalty: LoyaltyClient,
    products: ProductClient,
    delivery_fee: Decimal,
}

impl CheckoutClient {
    pub fn new(orders: OrderClient, loyalty: LoyaltyClient, products: ProductClient, delivery_fee: Decimal) -> Self {
        Self { orders, loyalty, products, delivery_fee }
    }

    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn quote(&self, request: QuoteRequest) -> Result<Quote, CheckoutError> {
        let lines = self.resolve_lines(&request.items).await?;
        let balance = match customer_key(request.email.as_deref())? {
            Some(key) if request.redeem_points => self.loyalty.get_balance(key).await?,
            _ => 0,
        };
        Ok(Quote::compute(&lines, request.redeem_points, balance, self.delivery_fee))
    }

    /// Places an order and settles loyalty points for it.
    ///
    /// The balance is read before this order's accrual, so points earned now
    /// can only be spent on a later order.
    #[instrument(skip(self, request), fields(order_id = ?request.order_id, mode = ?request.payment_mode))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, CheckoutError> {
        let lines = self.resolve_lines(&request.items).await?;
        let key = customer_key(request.customer.email.as_deref())?;
        let payment_reference = request
            .payment_reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let payment_status = match (request.payment_mode, &payment_reference) {
            (PaymentMode::Cash, _) => PaymentStatus::Cod,
            (PaymentMode::Online, Some(_)) => PaymentStatus::Paid,
            (PaymentMode::Online, None) => {
                return Err(CheckoutError::ValidationError(
                    "online payment requires a payment reference".to_string(),
                ))
            }
        };
        let params = validate_create(OrderCreate {
            customer: request.customer,
            payment_mode: request.payment_mode,
            payment_status,
            payment_reference: payment_reference.clone(),
            lines,
        })?;

        let redeem = request.redeem_points && key.is_some();

        if let Some(order_id) = self.find_replay(request.order_id.as_ref(), &params).await? {
            return self.replay(order_id, key, redeem, &params).await;
        }

        let balance = match &key {
            Some(key) => self.loyalty.get_balance(key.clone()).await?,
            None => 0,
        };
        let planned = Quote::compute(&params.lines, redeem, balance, self.delivery_fee);
        let order_id = self.store_order(request.order_id, &params, payment_reference.as_deref()).await?;

        let mut points_redeemed = 0;
        let mut points_earned = 0;
        let mut loyalty_balance = None;
        if let Some(key) = &key {
            if planned.points_to_redeem > 0 {
                match self
                    .loyalty
                    .redeem(key.clone(), planned.points_to_redeem, planned.subtotal, Some(order_id.clone()))
                    .await
                {
                    Ok(receipt) => {
                        points_redeemed = receipt.points;
                        loyalty_balance = Some(receipt.balance);
                    }
                    Err(e) => {
                        warn!(error = %e, "Redemption failed, withdrawing order");
                        self.withdraw(&order_id, &params.lines).await;
                        return Err(unrecorded_payment(payment_reference.as_deref(), e.into()));
                    }
                }
            }
            match self.loyalty.accrue(key.clone(), planned.points_to_earn, Some(order_id.clone())).await {
                Ok(receipt) => {
                    points_earned = receipt.points;
                    loyalty_balance = Some(receipt.balance);
                }
                // Accrual is keyed by order id, so a later retry is safe.
                Err(e) => error!(error = %e, %order_id, "Loyalty accrual failed after order was placed"),
            }
        }

        let order = self.orders.get_order(order_id).await?;
        info!(order_id = %order.order_id, points_redeemed, points_earned, "Checkout complete");
        Ok(CheckoutReceipt {
            quote: Quote::with_redemption(&params.lines, points_redeemed, self.delivery_fee),
            order,
            points_redeemed,
            points_earned,
            loyalty_balance,
            replayed: false,
        })
    }

    /// Answers a retried checkout from what the first attempt recorded.
    ///
    /// No new redemption is planned: the balance may already hold this
    /// order's accrual, and those points must not pay for the same order.
    async fn replay(
        &self,
        order_id: OrderId,
        key: Option<CustomerKey>,
        redeem: bool,
        params: &OrderCreate,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let mut points_redeemed = 0;
        let mut points_earned = 0;
        let mut loyalty_balance = None;
        if let Some(key) = key {
            if redeem {
                points_redeemed = self.loyalty.redeemed_for_order(key.clone(), &order_id).await?;
            }
            let units = params.lines.iter().map(|line| u64::from(line.quantity)).sum();
            match self.loyalty.accrue(key, units, Some(order_id.clone())).await {
                Ok(receipt) => {
                    points_earned = receipt.points;
                    loyalty_balance = Some(receipt.balance);
                }
                Err(e) => error!(error = %e, %order_id, "Loyalty accrual failed on retried checkout"),
            }
        }

        let order = self.orders.get_order(order_id).await?;
        info!(order_id = %order.order_id, points_redeemed, points_earned, "Checkout replayed");
        Ok(CheckoutReceipt {
            quote: Quote::with_redemption(&params.lines, points_redeemed, self.delivery_fee),
            order,
            points_redeemed,
            points_earned,
            loyalty_balance,
            replayed: true,
        })
    }

    /// Catalog name and price win over anything the client sent.
    async fn resolve_lines(&self, items: &[CartItem]) -> Result<Vec<LineItemCreate>, CheckoutError> {
        if items.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }
        let mut lines: Vec<LineItemCreate> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                return Err(CheckoutError::ValidationError(format!(
                    "quantity for {} must be at least 1",
                    item.product_id
                )));
            }
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.product_id) {
                line.quantity = line.quantity.saturating_add(item.quantity);
                continue;
            }
            let product = match self.products.get_product(item.product_id.clone()).await {
                Ok(product) => product,
                Err(ProductError::NotFound(id)) => {
                    return Err(CheckoutError::ValidationError(format!("unknown product {id}")))
                }
                Err(e) => return Err(e.into()),
            };
            lines.push(LineItemCreate {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }
        Ok(lines)
    }

    async fn find_replay(&self, order_id: Option<&OrderId>, params: &OrderCreate) -> Result<Option<OrderId>, CheckoutError> {
        let Some(order_id) = order_id else {
            return Ok(None);
        };
        match self.orders.get_order(order_id.clone()).await {
            Ok(existing) if existing.is_replay_of(params) => {
                info!(%order_id, "Checkout retried for an existing order");
                Ok(Some(order_id.clone()))
            }
            Ok(_) => Err(OrderError::Conflict(format!("order {order_id} already exists with different content")).into()),
            Err(OrderError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reserves stock and stores the order, undoing the reservation on failure.
    async fn store_order(
        &self,
        order_id: Option<OrderId>,
        params: &OrderCreate,
        payment_reference: Option<&str>,
    ) -> Result<OrderId, CheckoutError> {
        let mut reserved: Vec<&LineItemCreate> = Vec::with_capacity(params.lines.len());
        for line in &params.lines {
            if let Err(e) = self.products.reserve_stock(line.product_id.clone(), line.quantity).await {
                self.release(reserved).await;
                return Err(e.into());
            }
            reserved.push(line);
        }

        match self.orders.create_order(order_id, params.clone()).await {
            Ok(id) => Ok(id),
            Err(e) => {
                self.release(reserved).await;
                Err(unrecorded_payment(payment_reference, e.into()))
            }
        }
    }

    async fn withdraw(&self, order_id: &OrderId, lines: &[LineItemCreate]) {
        if let Err(e) = self.orders.delete_order(order_id.clone()).await {
            error!(%order_id, error = %e, "Compensating order delete failed");
        }
        self.release(lines.iter().collect()).await;
    }

    async fn release(&self, lines: Vec<&LineItemCreate>) {
        for line in lines {
            if let Err(e) = self.products.release_stock(line.product_id.clone(), line.quantity).await {
                error!(product_id = %line.product_id, error = %e, "Stock release failed");
            }
        }
    }
}

/// A checkout that fails after an online payment was taken must hand back
/// the payment reference for manual reconciliation.
fn unrecorded_payment(payment_reference: Option<&str>, error: CheckoutError) -> CheckoutError {
    match payment_reference {
        Some(reference) => {
            error!(payment_reference = reference, error = %error, "Online payment taken but order not recorded");
            CheckoutError::PaymentNotRecorded { payment_reference: reference.to_string(), reason: error.to_string() }
        }
        None => error,
    }
}

fn customer_key(email: Option<&str>) -> Result<Option<CustomerKey>, CheckoutError> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        None => Ok(None),
        Some(email) => CustomerKey::parse(email)
            .map(Some)
            .ok_or_else(|| CheckoutError::ValidationError(format!("invalid email {email}"))),
    }
}
