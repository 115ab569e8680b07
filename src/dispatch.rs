//! Kitchen-to-door handoff: rider assignment and status moves that touch
//! both an order and the staff roster.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::clients::{OrderClient, StaffClient};
use crate::domain::{Order, OrderId, OrderStatus, StaffAssignment};
use crate::order_actor::OrderError;
use crate::staff_actor::StaffError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Staff(#[from] StaffError),
}

#[derive(Clone)]
pub struct DispatchClient {
    orders: OrderClient,
    staff: StaffClient,
}

impl DispatchClient {
    pub fn new(orders: OrderClient, staff: StaffClient) -> Self {
        Self { orders, staff }
    }

    /// Books a free rider and hands them the order.
    ///
    /// The rider is booked first. If the order then refuses the assignment
    /// the booking is released again.
    #[instrument(skip(self))]
    pub async fn assign(&self, order_id: OrderId, staff_id: String) -> Result<Order, DispatchError> {
        let rider = self.staff.assign(staff_id.clone()).await?;
        let assignment = StaffAssignment {
            staff_id: rider.id.clone(),
            staff_name: rider.name.clone(),
            staff_phone: rider.phone.clone(),
            staff_email: rider.email.clone(),
            assigned_at: Utc::now(),
        };
        match self.orders.assign_staff(order_id, assignment).await {
            Ok(order) => {
                info!(staff_name = %rider.name, "Rider dispatched");
                Ok(order)
            }
            Err(e) => {
                if let Err(release) = self.staff.release(staff_id).await {
                    error!(error = %release, "Could not release rider after failed assignment");
                }
                Err(e.into())
            }
        }
    }

    /// Moves the order forward; delivery frees its rider.
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, DispatchError> {
        let order = self.orders.update_status(order_id, status).await?;
        if order.status == OrderStatus::Delivered {
            self.release_rider(&order).await;
        }
        Ok(order)
    }

    /// Admin delete. A rider still out with the order is freed.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<Order, DispatchError> {
        let order = self.orders.delete_order(order_id).await?;
        if order.status == OrderStatus::OutForDelivery {
            self.release_rider(&order).await;
        }
        Ok(order)
    }

    async fn release_rider(&self, order: &Order) {
        let Some(assignment) = &order.staff_assignment else {
            return;
        };
        match self.staff.release(assignment.staff_id.clone()).await {
            Ok(_) => info!(staff_id = %assignment.staff_id, "Rider released"),
            // The rider may have been removed from the roster meanwhile.
            Err(e) => error!(staff_id = %assignment.staff_id, error = %e, "Rider release failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::{DeliveryStaff, StaffCreate, StaffStatus};
    use crate::mock_framework::{create_mock_client, expect_action};
    use crate::order_actor::entity::tests::{cash_order, line};
    use crate::staff_actor::StaffAction;

    async fn rider(staff: &StaffClient) -> DeliveryStaff {
        staff
            .create_staff_member(StaffCreate { name: "Ravi".into(), phone: "9000000000".into(), email: None })
            .await
            .unwrap()
    }

    fn start() -> (DispatchClient, OrderClient, StaffClient) {
        let (order_actor, orders) = ResourceActor::<Order>::new(16, OrderId::generate);
        let (staff_actor, staff) = ResourceActor::<DeliveryStaff>::new(16, || "staff_1".to_string());
        tokio::spawn(order_actor.run());
        tokio::spawn(staff_actor.run());
        let orders = OrderClient::new(orders);
        let staff = StaffClient::new(staff);
        (DispatchClient::new(orders.clone(), staff.clone()), orders, staff)
    }

    #[tokio::test]
    async fn delivery_releases_rider() {
        let (dispatch, orders, staff) = start();
        let rider = rider(&staff).await;
        let order_id = orders.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();

        let order = dispatch.assign(order_id.clone(), rider.id.clone()).await.unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(staff.get_staff_member(rider.id.clone()).await.unwrap().status, StaffStatus::Assigned);

        dispatch.update_status(order_id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(staff.get_staff_member(rider.id).await.unwrap().status, StaffStatus::NotAssigned);
    }

    #[tokio::test]
    async fn deleting_dispatched_order_frees_rider() {
        let (dispatch, orders, staff) = start();
        let rider = rider(&staff).await;
        let order_id = orders.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        dispatch.assign(order_id.clone(), rider.id.clone()).await.unwrap();

        let deleted = dispatch.delete_order(order_id.clone()).await.unwrap();
        assert_eq!(deleted.status, OrderStatus::OutForDelivery);
        assert!(matches!(orders.get_order(order_id).await, Err(OrderError::NotFound(_))));
        assert_eq!(staff.get_staff_member(rider.id.clone()).await.unwrap().status, StaffStatus::NotAssigned);
        staff.delete_staff_member(rider.id).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_delivered_order_leaves_rider_free_for_others() {
        let (dispatch, orders, staff) = start();
        let rider = rider(&staff).await;
        let first = orders.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        let second = orders.create_order(None, cash_order(vec![line("2", 1, 99)])).await.unwrap();
        dispatch.assign(first.clone(), rider.id.clone()).await.unwrap();
        dispatch.update_status(first.clone(), OrderStatus::Delivered).await.unwrap();
        dispatch.assign(second, rider.id.clone()).await.unwrap();

        dispatch.delete_order(first).await.unwrap();
        assert_eq!(staff.get_staff_member(rider.id).await.unwrap().status, StaffStatus::Assigned);
    }

    #[tokio::test]
    async fn busy_rider_cannot_take_second_order() {
        let (dispatch, orders, staff) = start();
        let rider = rider(&staff).await;
        let first = orders.create_order(None, cash_order(vec![line("1", 1, 89)])).await.unwrap();
        let second = orders.create_order(None, cash_order(vec![line("2", 1, 99)])).await.unwrap();

        dispatch.assign(first, rider.id.clone()).await.unwrap();
        let err = dispatch.assign(second.clone(), rider.id).await.unwrap_err();
        assert!(matches!(err, DispatchError::Staff(StaffError::Unavailable(_))));
        assert!(orders.get_order(second).await.unwrap().staff_assignment.is_none());
    }

    #[tokio::test]
    async fn failed_order_assignment_releases_rider() {
        let (order_inner, mut order_rx) = create_mock_client::<Order>(4);
        let (staff_inner, mut staff_rx) = create_mock_client::<DeliveryStaff>(4);
        let dispatch = DispatchClient::new(OrderClient::new(order_inner), StaffClient::new(staff_inner));

        let order_id = OrderId::parse("OJ-000777").unwrap();
        let task = tokio::spawn({
            let order_id = order_id.clone();
            async move { dispatch.assign(order_id, "staff_1".into()).await }
        });

        let (id, action, responder) = expect_action(&mut staff_rx).await.expect("Expected staff Assign");
        assert_eq!(id, "staff_1");
        assert!(matches!(action, StaffAction::Assign));
        responder
            .send(Ok(DeliveryStaff {
                id: "staff_1".into(),
                name: "Ravi".into(),
                phone: "9000000000".into(),
                email: None,
                status: StaffStatus::Assigned,
                created_at: Utc::now(),
            }))
            .unwrap();

        let (id, _, responder) = expect_action(&mut order_rx).await.expect("Expected order AssignStaff");
        assert_eq!(id, order_id);
        responder
            .send(Err(crate::actor_framework::FrameworkError::NotFound(order_id.to_string())))
            .unwrap();

        let (_, action, responder) = expect_action(&mut staff_rx).await.expect("Expected staff Release");
        assert!(matches!(action, StaffAction::Release));
        responder
            .send(Ok(DeliveryStaff {
                id: "staff_1".into(),
                name: "Ravi".into(),
                phone: "9000000000".into(),
                email: None,
                status: StaffStatus::NotAssigned,
                created_at: Utc::now(),
            }))
            .unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(DispatchError::Order(OrderError::NotFound(_)))));
    }
}
