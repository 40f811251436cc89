use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::order::{
    AdminOrderResponse, CreateOrderRequest, MarkPaidResponse, OrderResponse,
};
use crate::orders::service;
use crate::AppState;

fn parse_order_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found("Order not found"))
}

/// POST /api/orders. Guest checkout is allowed; a valid token links the
/// order to the account.
pub async fn create_order(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    body: Option<Json<CreateOrderRequest>>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    // The demo identity has no account row, so its orders stay guest orders.
    let user_id = user.and_then(|Extension(u)| Uuid::parse_str(&u.id).ok());
    let order = service::create_order(&state.stores, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /api/orders/me
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = match Uuid::parse_str(&user.id) {
        Ok(user_id) => service::my_orders(&state.stores, user_id).await?,
        Err(_) => Vec::new(),
    };
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/orders/all
pub async fn all_orders(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AdminOrderResponse>>> {
    let rows = service::all_orders(&state.stores).await?;
    Ok(Json(rows))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let id = parse_order_id(&id)?;
    let order = service::order_by_id(&state.stores, id).await?;
    Ok(Json(OrderResponse::detailed(order)))
}

/// PATCH /api/orders/:id/paid
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MarkPaidResponse>> {
    let id = parse_order_id(&id)?;
    let ack = service::mark_paid(&state.stores, id).await?;
    Ok(Json(ack))
}
