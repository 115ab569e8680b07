use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::auth::AdminGuard;
use crate::api::error::{created, ok, ApiJson, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{Feedback, FeedbackCreate, FeedbackSummary};

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    rating: Option<u8>,
}

/// GET /api/feedback - Newest first, optionally one rating only
pub async fn list(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(query): Query<FeedbackQuery>,
) -> AppResult<Json<AppResponse<Vec<Feedback>>>> {
    Ok(ok(state.feedback.list_by_rating(query.rating).await?))
}

/// POST /api/feedback - Rate an existing order, once
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FeedbackCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Feedback>>)> {
    state.orders.get_order(req.order_id.clone()).await?;
    Ok(created(state.feedback.submit_feedback(req).await?))
}

/// GET /api/feedback/summary
pub async fn summary(_admin: AdminGuard, State(state): State<AppState>) -> AppResult<Json<AppResponse<FeedbackSummary>>> {
    Ok(ok(state.feedback.summary().await?))
}

pub async fn delete(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Feedback>>> {
    Ok(ok(state.feedback.delete_feedback(id).await?))
}
