use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::disbursements::service::{self, ListQuery};
use crate::error::{ApiError, ApiResult};
use crate::models::disbursement::{
    CreateDisbursementRequest, DisbursementResponse, DisbursementStatusResponse,
    UpdateDisbursementStatusRequest,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementListParams {
    pub warehouse_id: Option<String>,
    pub status: Option<String>,
}

/// GET /api/disbursements
pub async fn list_disbursements(
    State(state): State<AppState>,
    Query(params): Query<DisbursementListParams>,
) -> ApiResult<Json<Vec<DisbursementResponse>>> {
    let rows = service::list_disbursements(
        &state.stores,
        ListQuery {
            warehouse_id: params.warehouse_id,
            status: params.status,
        },
    )
    .await?;
    Ok(Json(rows))
}

/// POST /api/disbursements
pub async fn create_disbursement(
    State(state): State<AppState>,
    body: Option<Json<CreateDisbursementRequest>>,
) -> ApiResult<(StatusCode, Json<DisbursementResponse>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let response = service::create_disbursement(&state.stores, body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /api/disbursements/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<UpdateDisbursementStatusRequest>>,
) -> ApiResult<Json<DisbursementStatusResponse>> {
    let status = body
        .and_then(|Json(b)| b.status)
        .ok_or_else(|| ApiError::bad_request("id and status required"))?;
    let id =
        Uuid::parse_str(&id).map_err(|_| ApiError::not_found("Disbursement not found"))?;
    let response = service::update_status(&state.stores, id, status).await?;
    Ok(Json(response))
}
