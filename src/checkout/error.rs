use thiserror::Error;

use crate::loyalty_actor::LoyaltyError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Failures while quoting or placing an order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Checkout validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),
    #[error(transparent)]
    Catalog(#[from] ProductError),
    /// Money was taken online but no order exists for it.
    #[error("Payment {payment_reference} was taken but the order was not recorded: {reason}")]
    PaymentNotRecorded { payment_reference: String, reason: String },
}
