use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Order, OrderCreate, OrderFilter, OrderId, OrderStatus, StaffAssignment};
use crate::order_actor::{OrderAction, OrderError};

/// Client for interacting with the Order actor.
///
/// Every method addresses a whole batch. The actor applies each request in a
/// single step, so a batch is never observed half-updated.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_client_new!(OrderClient, Order);

impl OrderClient {
    /// Stores a new batch and returns its id.
    ///
    /// With a caller-supplied id, retrying the same content is answered with
    /// the existing id; different content under that id is a `Conflict`.
    #[instrument(skip(self, params), fields(lines = params.lines.len()))]
    pub async fn create_order(&self, order_id: Option<OrderId>, params: OrderCreate) -> Result<OrderId, OrderError> {
        let created = match order_id {
            Some(id) => self.inner.create_with_id(id, params.clone()).await,
            None => self.inner.create(params.clone()).await,
        };
        match created {
            Ok(id) => {
                info!(order_id = %id, "Order batch created");
                Ok(id)
            }
            Err(FrameworkError::AlreadyExists(raw)) => {
                let id = OrderId::parse(&raw).ok_or_else(|| OrderError::Conflict(raw.clone()))?;
                let existing = self.get_order(id.clone()).await?;
                if existing.is_replay_of(&params) {
                    info!(order_id = %id, "Replayed order create");
                    Ok(id)
                } else {
                    warn!(order_id = %id, "Order id reused for a different checkout");
                    Err(OrderError::Conflict(format!("order {id} already exists with different content")))
                }
            }
            Err(FrameworkError::Storage(reason)) => {
                error!(%reason, "Order batch not persisted; insert rolled back");
                Err(OrderError::PartialBatch(reason))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Adds lines to an existing batch, or starts the batch if the id is new.
    #[instrument(skip(self, params))]
    pub async fn append_line(&self, order_id: OrderId, params: OrderCreate) -> Result<Order, OrderError> {
        match self.inner.perform_action(order_id.clone(), OrderAction::AppendLines(params.clone())).await {
            Ok(order) => Ok(order),
            Err(FrameworkError::NotFound(_)) => {
                debug!("First line for this order, creating the batch");
                match self.inner.create_with_id(order_id.clone(), params.clone()).await {
                    Ok(id) => self.get_order(id).await,
                    // Another request created the batch in between.
                    Err(FrameworkError::AlreadyExists(_)) => self
                        .inner
                        .perform_action(order_id, OrderAction::AppendLines(params))
                        .await
                        .map_err(OrderError::from),
                    Err(FrameworkError::Storage(reason)) => Err(OrderError::PartialBatch(reason)),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner
            .get(order_id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    /// Batches passing `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|order| filter.matches(order))
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_id.cmp(&a.order_id))
        });
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.inner.perform_action(order_id, OrderAction::UpdateStatus(status)).await?;
        info!(status = %order.status, lines = order.lines.len(), "Order status updated");
        Ok(order)
    }

    #[instrument(skip(self, assignment), fields(staff_id = %assignment.staff_id))]
    pub async fn assign_staff(&self, order_id: OrderId, assignment: StaffAssignment) -> Result<Order, OrderError> {
        let order = self.inner.perform_action(order_id, OrderAction::AssignStaff(assignment)).await?;
        info!("Staff assigned to order");
        Ok(order)
    }

    /// Customer cancellation, allowed only while the order is `received`.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.inner.delete_if(order_id, Order::ensure_cancellable).await?;
        info!("Order cancelled");
        Ok(order)
    }

    /// Admin delete, regardless of status.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.inner.delete(order_id).await?;
        info!(status = %order.status, "Order deleted");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::order_actor::entity::tests::{cash_order, line};

    fn start() -> OrderClient {
        let (actor, client) = ResourceActor::<Order>::new(16, OrderId::generate);
        tokio::spawn(actor.run());
        OrderClient::new(client)
    }

    fn id(raw: &str) -> OrderId {
        OrderId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_reports_total() {
        let client = start();
        let order_id = client
            .create_order(None, cash_order(vec![line("1", 2, 89), line("2", 1, 99)]))
            .await
            .unwrap();
        let order = client.get_order(order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.total(), rust_decimal::Decimal::from(277));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let client = start();
        let err = client.create_order(None, cash_order(vec![])).await.unwrap_err();
        assert_eq!(err, OrderError::EmptyCart);
    }

    #[tokio::test]
    async fn replayed_create_returns_same_id() {
        let client = start();
        let params = cash_order(vec![line("1", 2, 89)]);
        let first = client.create_order(Some(id("OJ-100001")), params.clone()).await.unwrap();
        let second = client.create_order(Some(id("OJ-100001")), params).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.list_orders(OrderFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reused_id_with_other_content_conflicts() {
        let client = start();
        client.create_order(Some(id("OJ-100002")), cash_order(vec![line("1", 2, 89)])).await.unwrap();
        let err = client
            .create_order(Some(id("OJ-100002")), cash_order(vec![line("1", 5, 89)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Conflict(_)));
    }

    #[tokio::test]
    async fn cancel_after_preparing_is_rejected_and_order_kept() {
        let client = start();
        let order_id = client.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        client.update_status(order_id.clone(), OrderStatus::Preparing).await.unwrap();

        let err = client.cancel_order(order_id.clone()).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidState(_)));
        assert_eq!(client.get_order(order_id).await.unwrap().status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn cancelled_order_is_gone() {
        let client = start();
        let order_id = client.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        client.cancel_order(order_id.clone()).await.unwrap();
        assert!(matches!(client.get_order(order_id).await, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn append_line_starts_then_extends_batch() {
        let client = start();
        let order_id = id("OJ-100003");
        client.append_line(order_id.clone(), cash_order(vec![line("1", 1, 89)])).await.unwrap();
        let order = client.append_line(order_id.clone(), cash_order(vec![line("2", 2, 99)])).await.unwrap();
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.order_id, order_id);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let client = start();
        let first = client.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        client.create_order(None, cash_order(vec![line("2", 1, 99)])).await.unwrap();
        client.update_status(first.clone(), OrderStatus::Delivered).await.unwrap();

        let filter = OrderFilter { status: Some(OrderStatus::Delivered), ..Default::default() };
        let delivered = client.list_orders(filter).await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].order_id, first);
    }
}
