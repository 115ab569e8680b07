//! Response envelope and HTTP error mapping.
//!
//! Every response body has the shape
//!
//! ```json
//! { "code": "E0000", "message": "Success", "data": { ... } }
//! ```
//!
//! | Code  | Status | Meaning |
//! |-------|--------|---------|
//! | E0002 | 400 | validation failed |
//! | E3001 | 401 | admin token missing or wrong |
//! | E0003 | 404 | not found |
//! | E0004 | 409 | conflict |
//! | E0005 | 422 | operation not allowed in the current state |
//! | E9003 | 502 | online payment not recorded |
//! | E9001/E9002 | 500 | internal or storage failure |

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::checkout::CheckoutError;
use crate::dispatch::DispatchError;
use crate::feedback_actor::FeedbackError;
use crate::loyalty_actor::LoyaltyError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::staff_actor::StaffError;

#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Well-formed request the current state does not allow (422).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Payment not recorded: {0}")]
    PaymentNotRecorded(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Admin token required"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.as_str()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),
            AppError::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.as_str()),
            AppError::PaymentNotRecorded(msg) => {
                error!(target: "payment", error = %msg, "Online payment needs manual reconciliation");
                (StatusCode::BAD_GATEWAY, "E9003", msg.as_str())
            }
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Storage error")
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9001", "Internal server error")
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });
        (status, body).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ValidationError(msg) => AppError::Validation(msg),
            OrderError::EmptyCart => AppError::Validation(e.to_string()),
            OrderError::NotFound(id) => AppError::NotFound(format!("Order {id} not found")),
            OrderError::InvalidState(msg) => AppError::BusinessRule(msg),
            OrderError::Conflict(msg) => AppError::Conflict(msg),
            OrderError::PartialBatch(_) | OrderError::StorageError(_) => AppError::Storage(e.to_string()),
            OrderError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<LoyaltyError> for AppError {
    fn from(e: LoyaltyError) -> Self {
        match e {
            LoyaltyError::ValidationError(msg) => AppError::Validation(msg),
            LoyaltyError::InsufficientPoints { .. } => AppError::BusinessRule(e.to_string()),
            LoyaltyError::InvalidState(msg) => AppError::BusinessRule(msg),
            LoyaltyError::StorageError(msg) => AppError::Storage(msg),
            LoyaltyError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {id} not found")),
            ProductError::InsufficientStock { .. } => AppError::BusinessRule(e.to_string()),
            ProductError::ValidationError(msg) => AppError::Validation(msg),
            ProductError::StorageError(msg) => AppError::Storage(msg),
            ProductError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StaffError> for AppError {
    fn from(e: StaffError) -> Self {
        match e {
            StaffError::NotFound(id) => AppError::NotFound(format!("Staff member {id} not found")),
            StaffError::ValidationError(msg) => AppError::Validation(msg),
            StaffError::Unavailable(msg) => AppError::Conflict(msg),
            StaffError::StorageError(msg) => AppError::Storage(msg),
            StaffError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<FeedbackError> for AppError {
    fn from(e: FeedbackError) -> Self {
        match e {
            FeedbackError::NotFound(id) => AppError::NotFound(format!("Feedback {id} not found")),
            FeedbackError::ValidationError(msg) => AppError::Validation(msg),
            FeedbackError::Immutable => AppError::BusinessRule(e.to_string()),
            FeedbackError::AlreadySubmitted(_) => AppError::Conflict(e.to_string()),
            FeedbackError::StorageError(msg) => AppError::Storage(msg),
            FeedbackError::ActorCommunicationError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::ValidationError(msg) => AppError::Validation(msg),
            CheckoutError::Order(e) => e.into(),
            CheckoutError::Loyalty(e) => e.into(),
            CheckoutError::Catalog(e) => e.into(),
            CheckoutError::PaymentNotRecorded { .. } => AppError::PaymentNotRecorded(e.to_string()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Order(e) => e.into(),
            DispatchError::Staff(e) => e.into(),
        }
    }
}

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    ok_with_message(data, "Success")
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}

/// 201 with the usual envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<AppResponse<T>>) {
    (StatusCode::CREATED, ok_with_message(data, "Created"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (OrderError::EmptyCart.into(), StatusCode::BAD_REQUEST),
            (OrderError::NotFound("OJ-000001".into()).into(), StatusCode::NOT_FOUND),
            (OrderError::InvalidState("preparing".into()).into(), StatusCode::UNPROCESSABLE_ENTITY),
            (OrderError::Conflict("taken".into()).into(), StatusCode::CONFLICT),
            (OrderError::PartialBatch("disk full".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (
                LoyaltyError::InsufficientPoints { requested: 5, available: 1 }.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CheckoutError::PaymentNotRecorded { payment_reference: "pay_1".into(), reason: "disk".into() }.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
