use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A fulfillment warehouse. Warehouses are never deleted; retiring one
/// means setting `is_active` to false, which blocks new disbursements
/// while keeping historical ones intact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Warehouse {
    /// Unique identifier for the warehouse
    pub id: Uuid,

    /// Display name, unique
    pub name: String,

    /// Short code, unique, stored uppercased
    pub code: String,

    /// Optional street address
    pub address: Option<String>,

    /// Whether the warehouse accepts new disbursements
    pub is_active: bool,

    /// Timestamp when the warehouse was registered
    pub created_at: DateTime<Utc>,
}

/// Admin request to register a warehouse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
}

/// Admin request to patch a warehouse. Absent fields are left untouched;
/// an empty `address` clears the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Normalized field changes applied by the store.
#[derive(Debug, Clone, Default)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub code: Option<String>,
    /// `Some(None)` clears the address
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Wire projection of a warehouse.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Warehouse> for WarehouseResponse {
    fn from(warehouse: Warehouse) -> Self {
        WarehouseResponse {
            id: warehouse.id,
            name: warehouse.name,
            code: warehouse.code,
            address: warehouse.address,
            is_active: warehouse.is_active,
            created_at: warehouse.created_at,
        }
    }
}
