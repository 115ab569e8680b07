use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{CustomerKey, LedgerEntryKind, LedgerReceipt, LoyaltyAccount, LoyaltySummary, OrderId};
use crate::loyalty_actor::{LoyaltyAction, LoyaltyError};

/// Client for the loyalty ledger.
///
/// Unknown customers read as a zero balance; their account appears with the
/// first ledger movement.
#[derive(Clone)]
pub struct LoyaltyClient {
    inner: ResourceClient<LoyaltyAccount>,
}

impl_client_new!(LoyaltyClient, LoyaltyAccount);

impl LoyaltyClient {
    #[instrument(skip(self, customer), fields(customer = %customer))]
    pub async fn get_balance(&self, customer: CustomerKey) -> Result<u64, LoyaltyError> {
        debug!("Sending request");
        let account = self.inner.get(customer).await?;
        Ok(account.map_or(0, |account| account.balance))
    }

    #[instrument(skip(self, customer), fields(customer = %customer))]
    pub async fn get_summary(&self, customer: CustomerKey) -> Result<LoyaltySummary, LoyaltyError> {
        debug!("Sending request");
        let account = self
            .inner
            .get(customer.clone())
            .await?
            .unwrap_or_else(|| LoyaltyAccount::empty(customer));
        Ok(account.summary())
    }

    /// Points already spent on `order_id`, 0 when that order redeemed none.
    #[instrument(skip(self, customer), fields(customer = %customer))]
    pub async fn redeemed_for_order(&self, customer: CustomerKey, order_id: &OrderId) -> Result<u64, LoyaltyError> {
        let account = self.inner.get(customer).await?;
        Ok(account
            .and_then(|account| {
                account
                    .entry_for_order(LedgerEntryKind::Redemption, order_id)
                    .map(|entry| entry.points)
            })
            .unwrap_or(0))
    }

    /// Credits `units` points. Keyed by `order_id`, a repeat is a no-op.
    #[instrument(skip(self, customer), fields(customer = %customer))]
    pub async fn accrue(
        &self,
        customer: CustomerKey,
        units: u64,
        order_id: Option<OrderId>,
    ) -> Result<LedgerReceipt, LoyaltyError> {
        let receipt = self
            .inner
            .perform_action(customer, LoyaltyAction::Accrue { units, order_id })
            .await?;
        Ok(receipt)
    }

    /// Spends `points` against an order worth `order_subtotal`.
    #[instrument(skip(self, customer), fields(customer = %customer))]
    pub async fn redeem(
        &self,
        customer: CustomerKey,
        points: u64,
        order_subtotal: Decimal,
        order_id: Option<OrderId>,
    ) -> Result<LedgerReceipt, LoyaltyError> {
        let receipt = self
            .inner
            .perform_action(customer, LoyaltyAction::Redeem { points, order_subtotal, order_id })
            .await?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;

    fn start() -> LoyaltyClient {
        let (actor, client) = ResourceActor::<LoyaltyAccount>::new(16, CustomerKey::unassigned);
        tokio::spawn(actor.run());
        LoyaltyClient::new(client)
    }

    fn asha() -> CustomerKey {
        CustomerKey::parse("Asha@Example.com").unwrap()
    }

    #[tokio::test]
    async fn unknown_customer_has_zero_balance() {
        let client = start();
        assert_eq!(client.get_balance(asha()).await.unwrap(), 0);
        let summary = client.get_summary(asha()).await.unwrap();
        assert_eq!(summary.balance, 0);
        assert!(summary.entries.is_empty());
    }

    #[tokio::test]
    async fn accrue_then_redeem() {
        let client = start();
        client.accrue(asha(), 50, None).await.unwrap();
        let receipt = client.redeem(asha(), 50, Decimal::from(200), None).await.unwrap();
        assert_eq!(receipt.balance, 0);
        let summary = client.get_summary(asha()).await.unwrap();
        assert_eq!(summary.total_earned, 50);
        assert_eq!(summary.total_redeemed, 50);
    }

    #[tokio::test]
    async fn failed_redeem_leaves_balance() {
        let client = start();
        client.accrue(asha(), 10, None).await.unwrap();
        let err = client.redeem(asha(), 11, Decimal::from(200), None).await.unwrap_err();
        assert_eq!(err, LoyaltyError::InsufficientPoints { requested: 11, available: 10 });
        assert_eq!(client.get_balance(asha()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn concurrent_redeems_never_overdraw() {
        let client = start();
        client.accrue(asha(), 10, None).await.unwrap();
        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.redeem(asha(), 3, Decimal::from(100), None).await })
            })
            .collect();
        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(client.get_balance(asha()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn redemption_lookup_is_per_order() {
        let client = start();
        let paid = OrderId::parse("OJ-100100");
        client.accrue(asha(), 20, None).await.unwrap();
        client.redeem(asha(), 15, Decimal::from(100), paid.clone()).await.unwrap();

        assert_eq!(client.redeemed_for_order(asha(), paid.as_ref().unwrap()).await.unwrap(), 15);
        let other = OrderId::parse("OJ-100101").unwrap();
        assert_eq!(client.redeemed_for_order(asha(), &other).await.unwrap(), 0);
        let stranger = CustomerKey::parse("ravi@example.com").unwrap();
        assert_eq!(client.redeemed_for_order(stranger, &other).await.unwrap(), 0);
    }
}
