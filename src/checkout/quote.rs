use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::LineItemCreate;

/// Price breakdown shown before the customer confirms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal: Decimal,
    pub points_to_redeem: u64,
    pub delivery_fee: Decimal,
    pub payable: Decimal,
    pub points_to_earn: u64,
}

impl Quote {
    /// One point is worth one currency unit and only whole units of the
    /// subtotal can be paid with points.
    pub fn compute(lines: &[LineItemCreate], redeem: bool, balance: u64, delivery_fee: Decimal) -> Self {
        let subtotal: Decimal = lines.iter().map(LineItemCreate::line_total).sum();
        let points_to_redeem = if redeem { redeemable(balance, subtotal) } else { 0 };
        Self::with_redemption(lines, points_to_redeem, delivery_fee)
    }

    /// Breakdown for a known number of redeemed points.
    pub fn with_redemption(lines: &[LineItemCreate], points: u64, delivery_fee: Decimal) -> Self {
        let subtotal: Decimal = lines.iter().map(LineItemCreate::line_total).sum();
        Self {
            subtotal,
            points_to_redeem: points,
            delivery_fee,
            payable: subtotal - Decimal::from(points) + delivery_fee,
            points_to_earn: lines.iter().map(|line| u64::from(line.quantity)).sum(),
        }
    }
}

fn redeemable(balance: u64, subtotal: Decimal) -> u64 {
    let whole = subtotal.floor();
    if whole <= Decimal::ZERO {
        return 0;
    }
    if Decimal::from(balance) <= whole {
        balance
    } else {
        whole.to_u64().unwrap_or(balance)
    }
}
