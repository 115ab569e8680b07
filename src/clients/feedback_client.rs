use tracing::{debug, info, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Feedback, FeedbackCreate, FeedbackSummary};
use crate::feedback_actor::FeedbackError;

#[derive(Clone)]
pub struct FeedbackClient {
    inner: ResourceClient<Feedback>,
}

impl_basic_client!(FeedbackClient, Feedback, FeedbackError, feedback);

impl FeedbackClient {
    /// Stores feedback for an order. A second submission for the same order
    /// is refused with `AlreadySubmitted`.
    #[instrument(skip(self, params), fields(order_id = %params.order_id, rating = params.rating))]
    pub async fn submit_feedback(&self, params: FeedbackCreate) -> Result<Feedback, FeedbackError> {
        debug!("Sending request");
        let order_id = params.order_id.clone();
        match self.inner.create_with_id(Feedback::id_for_order(&order_id), params).await {
            Ok(id) => {
                info!(feedback_id = %id, "Feedback received");
                self.get_feedback(id).await
            }
            Err(FrameworkError::AlreadyExists(_)) => Err(FeedbackError::AlreadySubmitted(order_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first, optionally only one star rating.
    #[instrument(skip(self))]
    pub async fn list_by_rating(&self, rating: Option<u8>) -> Result<Vec<Feedback>, FeedbackError> {
        let mut items: Vec<Feedback> = self
            .list_feedbacks()
            .await?
            .into_iter()
            .filter(|item| rating.map_or(true, |r| item.rating == r))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<FeedbackSummary, FeedbackError> {
        let items = self.list_feedbacks().await?;
        Ok(FeedbackSummary::from_feedback(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::OrderId;

    fn start() -> FeedbackClient {
        let (actor, client) = ResourceActor::<Feedback>::new(16, || "fb-unkeyed".to_string());
        tokio::spawn(actor.run());
        FeedbackClient::new(client)
    }

    fn rating(order: &str, rating: u8) -> FeedbackCreate {
        FeedbackCreate {
            order_id: OrderId::parse(order).unwrap(),
            name: "Meera".into(),
            email: None,
            rating,
            message: "Fresh and cold".into(),
        }
    }

    #[tokio::test]
    async fn one_feedback_per_order() {
        let client = start();
        let stored = client.submit_feedback(rating("OJ-161803", 5)).await.unwrap();
        assert_eq!(stored.order_id.as_str(), "OJ-161803");

        let err = client.submit_feedback(rating("OJ-161803", 1)).await.unwrap_err();
        assert_eq!(err, FeedbackError::AlreadySubmitted("OJ-161803".into()));
        assert_eq!(client.get_feedback(stored.id).await.unwrap().rating, 5);
    }

    #[tokio::test]
    async fn summary_counts_each_order_once() {
        let client = start();
        client.submit_feedback(rating("OJ-100001", 5)).await.unwrap();
        client.submit_feedback(rating("OJ-100002", 3)).await.unwrap();
        let _ = client.submit_feedback(rating("OJ-100002", 1)).await;

        let summary = client.summary().await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(client.list_by_rating(Some(3)).await.unwrap().len(), 1);
    }
}
