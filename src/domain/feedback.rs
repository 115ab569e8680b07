use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderId;

/// A customer's rating of one delivered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub order_id: OrderId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub rating: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCreate {
    pub order_id: OrderId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub rating: u8,
    pub message: String,
}

impl Feedback {
    /// Feedback is keyed by its order, so an order can be rated once.
    pub fn id_for_order(order_id: &OrderId) -> String {
        format!("fb-{order_id}")
    }
}

/// Rating breakdown shown on the admin feedback page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub count: usize,
    pub average_rating: f64,
    /// Index 0 holds one-star counts, index 4 five-star counts.
    pub per_rating: [usize; 5],
}

impl FeedbackSummary {
    pub fn from_feedback(items: &[Feedback]) -> Self {
        let mut per_rating = [0usize; 5];
        let mut sum = 0u32;
        for item in items {
            if (1..=5).contains(&item.rating) {
                per_rating[usize::from(item.rating - 1)] += 1;
            }
            sum += u32::from(item.rating);
        }
        // Display-only average; ratings are small integers so f64 is exact enough.
        let average_rating = if items.is_empty() {
            0.0
        } else {
            f64::from(sum) / items.len() as f64
        };
        Self { count: items.len(), average_rating, per_rating }
    }
}
