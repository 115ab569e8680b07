use rust_decimal::Decimal;

use crate::domain::OrderId;

/// Balance movements on a loyalty account.
///
/// Both variants may carry the order they belong to. A second call for the
/// same order is answered from the ledger instead of moving points again.
#[derive(Debug, Clone)]
pub enum LoyaltyAction {
    /// Credit one point per product unit ordered.
    Accrue { units: u64, order_id: Option<OrderId> },
    /// Spend points as a discount on an order.
    ///
    /// # Errors
    /// `InsufficientPoints` above the balance, `ValidationError` above the
    /// order subtotal.
    Redeem {
        points: u64,
        order_subtotal: Decimal,
        order_id: Option<OrderId>,
    },
}
