use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::warehouse::{
    CreateWarehouseRequest, UpdateWarehouseRequest, Warehouse, WarehousePatch, WarehouseResponse,
};
use crate::AppState;

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// GET /api/warehouses. Lists every warehouse, active or not, ordered by code.
pub async fn list_warehouses(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<WarehouseResponse>>> {
    let warehouses = state.stores.warehouses.list().await?;
    Ok(Json(
        warehouses.into_iter().map(WarehouseResponse::from).collect(),
    ))
}

/// POST /api/warehouses. Codes are stored uppercased.
pub async fn create_warehouse(
    State(state): State<AppState>,
    body: Option<Json<CreateWarehouseRequest>>,
) -> ApiResult<(StatusCode, Json<WarehouseResponse>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (name, code) = match (non_empty(body.name), non_empty(body.code)) {
        (Some(name), Some(code)) => (name, code),
        _ => return Err(ApiError::bad_request("name and code required")),
    };

    let warehouse = Warehouse {
        id: Uuid::new_v4(),
        name,
        code: code.to_uppercase(),
        address: non_empty(body.address),
        is_active: true,
        created_at: Utc::now(),
    };
    state.stores.warehouses.create(warehouse.clone()).await?;
    Ok((StatusCode::CREATED, Json(WarehouseResponse::from(warehouse))))
}

/// PATCH /api/warehouses/:id. Fields left out of the body keep their
/// value; sending an empty address clears it. Deactivation goes through
/// here, there is no delete.
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<UpdateWarehouseRequest>>,
) -> ApiResult<Json<WarehouseResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::not_found("Warehouse not found"))?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let patch = WarehousePatch {
        name: non_empty(body.name),
        code: non_empty(body.code).map(|c| c.to_uppercase()),
        address: body.address.map(|a| {
            let trimmed = a.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }),
        is_active: body.is_active,
    };

    let warehouse = state
        .stores
        .warehouses
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Warehouse not found"))?;
    Ok(Json(WarehouseResponse::from(warehouse)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Stores;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            stores: Stores::in_memory(),
            config: Arc::new(Config::default()),
            pool: None,
        }
    }

    fn create_body(name: &str, code: &str) -> Option<Json<CreateWarehouseRequest>> {
        Some(Json(CreateWarehouseRequest {
            name: Some(name.to_string()),
            code: Some(code.to_string()),
            address: Some("  12 Ring Road  ".to_string()),
        }))
    }

    #[tokio::test]
    async fn test_create_uppercases_the_code_and_trims_fields() {
        let state = test_state();
        let (status, Json(warehouse)) =
            create_warehouse(State(state), create_body("Cairo Hub", "cai-1"))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(warehouse.code, "CAI-1");
        assert_eq!(warehouse.address.as_deref(), Some("12 Ring Road"));
        assert!(warehouse.is_active);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_code() {
        let state = test_state();
        let result = create_warehouse(
            State(state),
            Some(Json(CreateWarehouseRequest {
                name: Some("Cairo Hub".to_string()),
                code: Some("   ".to_string()),
                address: None,
            })),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let state = test_state();
        create_warehouse(State(state.clone()), create_body("Cairo Hub", "CAI-1"))
            .await
            .unwrap();
        let result =
            create_warehouse(State(state), create_body("Giza Hub", "cai-1")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_patch_clears_the_address_and_deactivates() {
        let state = test_state();
        let (_, Json(created)) =
            create_warehouse(State(state.clone()), create_body("Cairo Hub", "CAI-1"))
                .await
                .unwrap();

        let Json(updated) = update_warehouse(
            State(state.clone()),
            Path(created.id.to_string()),
            Some(Json(UpdateWarehouseRequest {
                name: None,
                code: None,
                address: Some("".to_string()),
                is_active: Some(false),
            })),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Cairo Hub");
        assert!(updated.address.is_none());
        assert!(!updated.is_active);

        // Untouched fields survive a patch that only renames.
        let Json(renamed) = update_warehouse(
            State(state),
            Path(created.id.to_string()),
            Some(Json(UpdateWarehouseRequest {
                name: Some("Cairo Hub West".to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Cairo Hub West");
        assert_eq!(renamed.code, "CAI-1");
        assert!(!renamed.is_active);
    }

    #[tokio::test]
    async fn test_patching_an_unknown_warehouse_is_not_found() {
        let state = test_state();
        let result = update_warehouse(
            State(state.clone()),
            Path(Uuid::new_v4().to_string()),
            None,
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let result = update_warehouse(State(state), Path("not-a-uuid".to_string()), None).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
