//! Admin authentication.
//!
//! Admin routes take an [`AdminGuard`] argument. The extractor compares the
//! `Authorization: Bearer` header with the configured admin token; when no
//! token is configured every admin request is refused.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use super::error::AppError;
use super::AppState;

/// Proof that the request carried the admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            warn!(uri = %parts.uri, "Admin route called but no admin token is configured");
            return Err(AppError::Unauthorized);
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);

        match presented {
            Some(token) if token == expected => Ok(AdminGuard),
            Some(_) => {
                warn!(uri = %parts.uri, "Admin token rejected");
                Err(AppError::Unauthorized)
            }
            None => Err(AppError::Unauthorized),
        }
    }
}
