use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::auth::AdminGuard;
use crate::api::error::{created, ok, ApiJson, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{DeliveryStaff, StaffCreate, StaffPatch};

/// GET /api/staff - Roster sorted by name
pub async fn list(_admin: AdminGuard, State(state): State<AppState>) -> AppResult<Json<AppResponse<Vec<DeliveryStaff>>>> {
    let mut staff = state.staff.list_staff_members().await?;
    staff.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ok(staff))
}

pub async fn create(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StaffCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<DeliveryStaff>>)> {
    Ok(created(state.staff.create_staff_member(req).await?))
}

pub async fn update(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StaffPatch>,
) -> AppResult<Json<AppResponse<DeliveryStaff>>> {
    Ok(ok(state.staff.update_staff_member(id, req).await?))
}

pub async fn delete(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DeliveryStaff>>> {
    Ok(ok(state.staff.delete_staff_member(id).await?))
}

/// POST /api/staff/{id}/toggle - Flip availability by hand
pub async fn toggle(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DeliveryStaff>>> {
    Ok(ok(state.staff.toggle(id).await?))
}
