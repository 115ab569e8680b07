use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::actions::LoyaltyAction;
use super::error::LoyaltyError;
use crate::actor_framework::Entity;
use crate::domain::{CustomerKey, LedgerEntry, LedgerEntryKind, LedgerReceipt, LoyaltyAccount, OrderId};

impl Entity for LoyaltyAccount {
    type Id = CustomerKey;
    type CreateParams = ();
    type Patch = ();
    type Action = LoyaltyAction;
    type ActionResult = LedgerReceipt;
    type Error = LoyaltyError;

    fn id(&self) -> &CustomerKey {
        &self.customer
    }

    fn from_create_params(customer: CustomerKey, _params: ()) -> Result<Self, LoyaltyError> {
        Ok(Self::empty(customer))
    }

    /// Balances only move through ledger entries.
    fn on_update(&mut self, _patch: ()) -> Result<(), LoyaltyError> {
        Err(LoyaltyError::InvalidState("balances change through accrue and redeem only".to_string()))
    }

    fn on_delete(&self) -> Result<(), LoyaltyError> {
        Err(LoyaltyError::InvalidState(format!(
            "loyalty account {} cannot be deleted",
            self.customer
        )))
    }

    fn handle_action(&mut self, action: LoyaltyAction) -> Result<LedgerReceipt, LoyaltyError> {
        match action {
            LoyaltyAction::Accrue { units, order_id } => self.accrue(units, order_id),
            LoyaltyAction::Redeem { points, order_subtotal, order_id } => {
                self.redeem(points, order_subtotal, order_id)
            }
        }
    }

    /// Accounts come into existence on their first ledger movement.
    fn vacant(customer: &CustomerKey) -> Option<Self> {
        Some(Self::empty(customer.clone()))
    }
}

impl LoyaltyAccount {
    fn accrue(&mut self, units: u64, order_id: Option<OrderId>) -> Result<LedgerReceipt, LoyaltyError> {
        if let Some(receipt) = self.replayed(LedgerEntryKind::Accrual, order_id.as_ref()) {
            return Ok(receipt);
        }
        let balance_after = self
            .balance
            .checked_add(units)
            .ok_or_else(|| LoyaltyError::ValidationError(format!("accruing {units} points overflows the balance")))?;
        self.record(LedgerEntryKind::Accrual, units, balance_after, order_id);
        Ok(LedgerReceipt { balance: self.balance, points: units, replayed: false })
    }

    fn redeem(
        &mut self,
        points: u64,
        order_subtotal: Decimal,
        order_id: Option<OrderId>,
    ) -> Result<LedgerReceipt, LoyaltyError> {
        if let Some(receipt) = self.replayed(LedgerEntryKind::Redemption, order_id.as_ref()) {
            return Ok(receipt);
        }
        if order_subtotal < Decimal::ZERO {
            return Err(LoyaltyError::ValidationError("order subtotal must not be negative".to_string()));
        }
        if points > self.balance {
            return Err(LoyaltyError::InsufficientPoints { requested: points, available: self.balance });
        }
        if Decimal::from(points) > order_subtotal {
            return Err(LoyaltyError::ValidationError(format!(
                "cannot redeem {points} points against a subtotal of {order_subtotal}"
            )));
        }
        self.record(LedgerEntryKind::Redemption, points, self.balance - points, order_id);
        Ok(LedgerReceipt { balance: self.balance, points, replayed: false })
    }

    fn replayed(&self, kind: LedgerEntryKind, order_id: Option<&OrderId>) -> Option<LedgerReceipt> {
        let entry = self.entry_for_order(kind, order_id?)?;
        debug!(customer = %self.customer, order_id = ?entry.order_id, ?kind, "Ledger entry already recorded");
        Some(LedgerReceipt { balance: self.balance, points: entry.points, replayed: true })
    }

    fn record(&mut self, kind: LedgerEntryKind, points: u64, balance_after: u64, order_id: Option<OrderId>) {
        if points == 0 {
            return;
        }
        info!(customer = %self.customer, ?kind, points, balance_after, "Ledger entry recorded");
        self.entries.push(LedgerEntry {
            kind,
            points,
            balance_before: self.balance,
            balance_after,
            order_id,
            recorded_at: Utc::now(),
        });
        self.balance = balance_after;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> LoyaltyAccount {
        LoyaltyAccount::vacant(&CustomerKey::parse("asha@example.com").unwrap()).unwrap()
    }

    fn order(n: &str) -> Option<OrderId> {
        OrderId::parse(n)
    }

    fn redeem(points: u64, subtotal: i64, order_id: Option<OrderId>) -> LoyaltyAction {
        LoyaltyAction::Redeem { points, order_subtotal: Decimal::from(subtotal), order_id }
    }

    #[test]
    fn accrue_adds_units_and_logs_entry() {
        let mut account = account();
        let receipt = account
            .handle_action(LoyaltyAction::Accrue { units: 3, order_id: order("OJ-000001") })
            .unwrap();
        assert_eq!(receipt, LedgerReceipt { balance: 3, points: 3, replayed: false });
        assert_eq!(account.entries.len(), 1);
        assert_eq!(account.entries[0].balance_before, 0);
        assert_eq!(account.entries[0].balance_after, 3);
    }

    #[test]
    fn accrual_for_same_order_is_credited_once() {
        let mut account = account();
        account.handle_action(LoyaltyAction::Accrue { units: 2, order_id: order("OJ-000001") }).unwrap();
        let receipt = account
            .handle_action(LoyaltyAction::Accrue { units: 2, order_id: order("OJ-000001") })
            .unwrap();
        assert!(receipt.replayed);
        assert_eq!(account.balance, 2);
        assert_eq!(account.total_earned(), 2);
    }

    #[test]
    fn redeem_cannot_exceed_balance() {
        let mut account = account();
        account.handle_action(LoyaltyAction::Accrue { units: 5, order_id: None }).unwrap();
        let err = account.handle_action(redeem(6, 100, None)).unwrap_err();
        assert_eq!(err, LoyaltyError::InsufficientPoints { requested: 6, available: 5 });
        assert_eq!(account.balance, 5);
    }

    #[test]
    fn redeem_cannot_exceed_order_subtotal() {
        let mut account = account();
        account.handle_action(LoyaltyAction::Accrue { units: 50, order_id: None }).unwrap();
        let err = account.handle_action(redeem(40, 30, None)).unwrap_err();
        assert!(matches!(err, LoyaltyError::ValidationError(_)));
        assert_eq!(account.balance, 50);
    }

    #[test]
    fn redeem_spends_points_and_tracks_totals() {
        let mut account = account();
        account.handle_action(LoyaltyAction::Accrue { units: 50, order_id: None }).unwrap();
        let receipt = account.handle_action(redeem(50, 200, order("OJ-000002"))).unwrap();
        assert_eq!(receipt.balance, 0);

        let again = account.handle_action(redeem(50, 200, order("OJ-000002"))).unwrap();
        assert!(again.replayed);
        assert_eq!(again.points, 50);
        assert_eq!(account.balance, 0);
        assert_eq!(account.total_redeemed(), 50);
    }

    #[test]
    fn zero_point_moves_leave_no_entry() {
        let mut account = account();
        account.handle_action(LoyaltyAction::Accrue { units: 0, order_id: None }).unwrap();
        account.handle_action(redeem(0, 10, None)).unwrap();
        assert!(account.entries.is_empty());
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn accounts_cannot_be_deleted() {
        assert!(matches!(account().on_delete(), Err(LoyaltyError::InvalidState(_))));
    }
}
