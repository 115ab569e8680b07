//! Product API Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::auth::AdminGuard;
use crate::api::error::{created, ok, ApiJson, AppResponse, AppResult};
use crate::api::AppState;
use crate::domain::{Product, ProductCreate, ProductPatch};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    category: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    stock: u32,
}

/// GET /api/products - Catalog, optionally by category or search text
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = state.products.search_products(query.category, query.search).await?;
    Ok(ok(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    Ok(ok(state.products.get_product(id).await?))
}

/// POST /api/products
pub async fn create(
    _admin: AdminGuard,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProductCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Product>>)> {
    Ok(created(state.products.create_product(req).await?))
}

/// PUT /api/products/{id}
pub async fn update(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ProductPatch>,
) -> AppResult<Json<AppResponse<Product>>> {
    Ok(ok(state.products.update_product(id, req).await?))
}

/// PUT /api/products/{id}/stock - Overwrite the stock level
pub async fn set_stock(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StockRequest>,
) -> AppResult<Json<AppResponse<Product>>> {
    state.products.set_stock(id.clone(), req.stock).await?;
    Ok(ok(state.products.get_product(id).await?))
}

/// DELETE /api/products/{id}
pub async fn delete(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    Ok(ok(state.products.delete_product(id).await?))
}
