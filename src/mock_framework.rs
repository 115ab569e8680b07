//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to assert behavior.

use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};

/// Creates a mock client and a receiver for asserting requests.
///
/// Orchestration code (checkout, dispatch) talks to several actors in a fixed
/// order. Handing it mock clients lets a test answer each request by hand,
/// including failures a real actor rarely produces.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Option<T::Id>, T::CreateParams, Response<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { id, params, respond_to }) => Some((id, params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::LoyaltyClient;
    use crate::domain::{CustomerKey, Feedback, FeedbackCreate, LedgerReceipt, LoyaltyAccount, OrderId};
    use crate::loyalty_actor::LoyaltyAction;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Feedback>(10);

        let create_task = tokio::spawn(async move {
            let params = FeedbackCreate {
                order_id: OrderId::parse("OJ-000042").unwrap(),
                name: "Test".into(),
                email: None,
                rating: 5,
                message: "Fresh".into(),
            };
            client.create(params).await
        });

        let (id, payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(id, None);
        assert_eq!(payload.rating, 5);
        responder.send(Ok("fb_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("fb_1".to_string()));
    }

    #[tokio::test]
    async fn loyalty_client_reads_missing_account_as_zero() {
        let (inner, mut receiver) = create_mock_client::<LoyaltyAccount>(4);
        let client = LoyaltyClient::new(inner);
        let customer = CustomerKey::parse("asha@example.com").unwrap();

        let task = tokio::spawn({
            let customer = customer.clone();
            async move { client.get_balance(customer).await }
        });
        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, customer);
        responder.send(Ok(None)).unwrap();
        assert_eq!(task.await.unwrap(), Ok(0));
    }

    #[tokio::test]
    async fn loyalty_accrual_carries_order_key() {
        let (inner, mut receiver) = create_mock_client::<LoyaltyAccount>(4);
        let client = LoyaltyClient::new(inner);
        let customer = CustomerKey::parse("asha@example.com").unwrap();
        let order_id = OrderId::parse("OJ-123456");

        let task = tokio::spawn({
            let order_id = order_id.clone();
            async move { client.accrue(customer, 4, order_id).await }
        });
        let (_, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        match action {
            LoyaltyAction::Accrue { units, order_id: key } => {
                assert_eq!(units, 4);
                assert_eq!(key, order_id);
            }
            other => panic!("Unexpected action: {:?}", other),
        }
        let receipt = LedgerReceipt { balance: 4, points: 4, replayed: false };
        responder.send(Ok(receipt)).unwrap();
        assert_eq!(task.await.unwrap(), Ok(receipt));
    }
}
