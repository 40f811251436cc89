use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::{OrderStatus, ShippingAddress};

/// Disbursement lifecycle: PENDING -> IN_PROGRESS -> COMPLETED, or
/// CANCELLED at any point. New disbursements always start PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisbursementStatus {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "IN_PROGRESS")]
    InProgress,
    #[sqlx(rename = "COMPLETED")]
    Completed,
    #[sqlx(rename = "CANCELLED")]
    Cancelled,
}

impl std::fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DisbursementStatus::Pending => "PENDING",
            DisbursementStatus::InProgress => "IN_PROGRESS",
            DisbursementStatus::Completed => "COMPLETED",
            DisbursementStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// One product line on a picking list.
#[derive(Debug, Clone)]
pub struct DisbursementItem {
    /// Catalog product id, mirrored from the order item
    pub product_id: String,

    /// Units to pick
    pub quantity: i32,

    /// Units picked so far. Nothing advances this yet; warehouse scanner
    /// integration will write it.
    pub picked_quantity: i32,
}

/// A picking order sent to a warehouse. An order gets at most one; the
/// rule is enforced by the creation guard, not by the schema.
#[derive(Debug, Clone)]
pub struct Disbursement {
    /// Unique identifier for the disbursement
    pub id: Uuid,

    /// Order being fulfilled
    pub order_id: Uuid,

    /// Warehouse doing the picking
    pub warehouse_id: Uuid,

    /// Lifecycle status
    pub status: DisbursementStatus,

    /// Optional instructions for the warehouse
    pub notes: Option<String>,

    /// When picking finished
    pub completed_at: Option<DateTime<Utc>>,

    /// Timestamp when the disbursement was created
    pub created_at: DateTime<Utc>,

    /// Picking lines, mirrored from the order items at creation
    pub items: Vec<DisbursementItem>,
}

/// Filters accepted by the disbursement listing.
#[derive(Debug, Clone, Default)]
pub struct DisbursementFilter {
    pub warehouse_id: Option<Uuid>,
    pub status: Option<DisbursementStatus>,
}

/// Admin request to send an order to a warehouse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisbursementRequest {
    pub order_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub notes: Option<String>,
}

/// Admin request to move a disbursement through its lifecycle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDisbursementStatusRequest {
    pub status: Option<DisbursementStatus>,
}

/// Warehouse identity embedded in disbursement projections.
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseRef {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

/// Order summary embedded in the disbursement listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementOrderSummary {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub currency: String,
    pub shipping_address: ShippingAddress,
}

/// Picking line projection. The product name is resolved from the catalog
/// for listings and omitted right after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementItemView {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: i32,
    pub picked_quantity: i32,
}

/// Full disbursement projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub warehouse_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<WarehouseRef>,
    pub status: DisbursementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<DisbursementOrderSummary>,
    pub items: Vec<DisbursementItemView>,
}

/// Acknowledgement for a status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementStatusResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: DisbursementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&DisbursementStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_status_deserializes_from_wire_values() {
        let status: DisbursementStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, DisbursementStatus::Completed);
        assert!(serde_json::from_str::<DisbursementStatus>("\"completed\"").is_err());
    }
}
