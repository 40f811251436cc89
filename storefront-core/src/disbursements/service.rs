use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::disbursement::{
    CreateDisbursementRequest, Disbursement, DisbursementFilter, DisbursementItem,
    DisbursementItemView, DisbursementOrderSummary, DisbursementResponse,
    DisbursementStatus, DisbursementStatusResponse, WarehouseRef,
};
use crate::models::order::OrderStatus;
use crate::models::warehouse::Warehouse;
use crate::store::Stores;

/// Query parameters of the disbursement listing, still unparsed.
#[derive(Debug, Default, Clone)]
pub struct ListQuery {
    pub warehouse_id: Option<String>,
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Option<DisbursementStatus> {
    match raw {
        "PENDING" => Some(DisbursementStatus::Pending),
        "IN_PROGRESS" => Some(DisbursementStatus::InProgress),
        "COMPLETED" => Some(DisbursementStatus::Completed),
        "CANCELLED" => Some(DisbursementStatus::Cancelled),
        _ => None,
    }
}

fn warehouse_ref(warehouse: &Warehouse) -> WarehouseRef {
    WarehouseRef {
        id: warehouse.id,
        name: warehouse.name.clone(),
        code: warehouse.code.clone(),
    }
}

/// Sends a CONFIRMED order to a warehouse for picking. The picking lines
/// mirror the order items; the order itself moves to PROCESSING in the
/// same store transaction that writes the disbursement, so two admins
/// racing on one order produce exactly one picking list.
pub async fn create_disbursement(
    stores: &Stores,
    body: CreateDisbursementRequest,
) -> ApiResult<DisbursementResponse> {
    let (order_id, warehouse_id) = match (body.order_id, body.warehouse_id) {
        (Some(o), Some(w)) if !o.is_empty() && !w.is_empty() => (o, w),
        _ => return Err(ApiError::bad_request("orderId and warehouseId required")),
    };
    let order_id =
        Uuid::parse_str(&order_id).map_err(|_| ApiError::not_found("Order not found"))?;
    let warehouse_id = Uuid::parse_str(&warehouse_id)
        .map_err(|_| ApiError::not_found("Warehouse not found or inactive"))?;

    let order = stores
        .orders
        .find(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    if order.status != OrderStatus::Confirmed {
        return Err(ApiError::bad_request(
            "Order must be CONFIRMED (payment approved) before creating disbursement",
        ));
    }
    if stores.disbursements.find_by_order(order_id).await?.is_some() {
        return Err(ApiError::bad_request("Order already has a disbursement"));
    }

    let warehouse = stores
        .warehouses
        .find(warehouse_id)
        .await?
        .filter(|w| w.is_active)
        .ok_or_else(|| ApiError::not_found("Warehouse not found or inactive"))?;

    let disbursement = Disbursement {
        id: Uuid::new_v4(),
        order_id,
        warehouse_id,
        status: DisbursementStatus::Pending,
        notes: body
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        completed_at: None,
        created_at: Utc::now(),
        items: order
            .items
            .iter()
            .map(|item| DisbursementItem {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                picked_quantity: 0,
            })
            .collect(),
    };
    stores.disbursements.create(disbursement.clone()).await?;

    Ok(DisbursementResponse {
        id: disbursement.id,
        order_id: disbursement.order_id,
        warehouse_id: disbursement.warehouse_id,
        warehouse: Some(warehouse_ref(&warehouse)),
        status: disbursement.status,
        notes: disbursement.notes,
        completed_at: None,
        created_at: disbursement.created_at,
        order: None,
        items: disbursement
            .items
            .into_iter()
            .map(|item| DisbursementItemView {
                product_id: item.product_id,
                product_name: None,
                quantity: item.quantity,
                picked_quantity: item.picked_quantity,
            })
            .collect(),
    })
}

/// Moves a disbursement through its lifecycle. COMPLETED stamps the
/// completion time and re-asserts PROCESSING on the order.
pub async fn update_status(
    stores: &Stores,
    id: Uuid,
    status: DisbursementStatus,
) -> ApiResult<DisbursementStatusResponse> {
    if status == DisbursementStatus::Pending {
        return Err(ApiError::bad_request(
            "status must be IN_PROGRESS, COMPLETED or CANCELLED",
        ));
    }

    let completed_at = if status == DisbursementStatus::Completed {
        Some(Utc::now())
    } else {
        None
    };
    let updated = stores
        .disbursements
        .set_status(id, status, completed_at)
        .await?
        .ok_or_else(|| ApiError::not_found("Disbursement not found"))?;

    if status == DisbursementStatus::Completed {
        stores
            .orders
            .set_status(updated.order_id, OrderStatus::Processing)
            .await?;
    }

    Ok(DisbursementStatusResponse {
        id: updated.id,
        order_id: updated.order_id,
        status: updated.status,
        completed_at: updated.completed_at,
    })
}

/// Lists disbursements for the back office, newest first, with the
/// warehouse, order summary and catalog product names joined in.
/// Unparseable filter values match nothing rather than everything.
pub async fn list_disbursements(
    stores: &Stores,
    query: ListQuery,
) -> ApiResult<Vec<DisbursementResponse>> {
    let mut filter = DisbursementFilter::default();
    if let Some(raw) = query.warehouse_id {
        match Uuid::parse_str(&raw) {
            Ok(id) => filter.warehouse_id = Some(id),
            Err(_) => return Ok(Vec::new()),
        }
    }
    if let Some(raw) = query.status {
        match parse_status(&raw) {
            Some(status) => filter.status = Some(status),
            None => return Ok(Vec::new()),
        }
    }

    let disbursements = stores.disbursements.list(&filter).await?;

    let warehouses: HashMap<Uuid, WarehouseRef> = stores
        .warehouses
        .list()
        .await?
        .iter()
        .map(|w| (w.id, warehouse_ref(w)))
        .collect();

    let mut product_ids: Vec<String> = disbursements
        .iter()
        .flat_map(|d| d.items.iter().map(|i| i.product_id.clone()))
        .collect();
    product_ids.sort();
    product_ids.dedup();
    let product_names = stores.catalog.product_names(&product_ids).await?;

    let mut rows = Vec::with_capacity(disbursements.len());
    for disbursement in disbursements {
        let order = stores
            .orders
            .find(disbursement.order_id)
            .await?
            .map(|o| DisbursementOrderSummary {
                id: o.id,
                status: o.status,
                total: o.total,
                currency: o.currency,
                shipping_address: o.shipping_address,
            });
        rows.push(DisbursementResponse {
            id: disbursement.id,
            order_id: disbursement.order_id,
            warehouse_id: disbursement.warehouse_id,
            warehouse: warehouses.get(&disbursement.warehouse_id).cloned(),
            status: disbursement.status,
            notes: disbursement.notes,
            completed_at: disbursement.completed_at,
            created_at: disbursement.created_at,
            order,
            items: disbursement
                .items
                .into_iter()
                .map(|item| DisbursementItemView {
                    product_name: product_names.get(&item.product_id).cloned(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                    picked_quantity: item.picked_quantity,
                })
                .collect(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{CreateOrderItem, CreateOrderRequest, ShippingAddress};
    use crate::orders::service as orders;
    use crate::store::WarehouseStore;
    use rust_decimal::Decimal;

    async fn seeded_warehouse(stores: &Stores, active: bool) -> Warehouse {
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: format!("Hub {}", Uuid::new_v4()),
            code: format!("W-{}", Uuid::new_v4()),
            address: Some("12 Ring Road".to_string()),
            is_active: active,
            created_at: Utc::now(),
        };
        WarehouseStore::create(&*stores.warehouses, warehouse.clone())
            .await
            .unwrap();
        warehouse
    }

    async fn seeded_order(stores: &Stores, paid: bool) -> Uuid {
        let order = orders::create_order(
            stores,
            None,
            CreateOrderRequest {
                items: Some(vec![CreateOrderItem {
                    product_id: "1".to_string(),
                    name: "iPhone 15 Pro Max".to_string(),
                    price: Decimal::from(1199),
                    quantity: 2,
                    image: None,
                    color: None,
                }]),
                subtotal: Some(Decimal::from(2398)),
                shipping: Some(Decimal::from(50)),
                tax: Some(Decimal::from(0)),
                total: Some(Decimal::from(2448)),
                currency: Some("EGP".to_string()),
                shipping_address: Some(ShippingAddress {
                    phone: Some("+20100000000".to_string()),
                    ..Default::default()
                }),
            },
        )
        .await
        .unwrap();
        if paid {
            orders::mark_paid(stores, order.id).await.unwrap();
        }
        order.id
    }

    fn request(order_id: Uuid, warehouse_id: Uuid) -> CreateDisbursementRequest {
        CreateDisbursementRequest {
            order_id: Some(order_id.to_string()),
            warehouse_id: Some(warehouse_id.to_string()),
            notes: Some("  pack fragile  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_creation_copies_order_items_and_moves_the_order() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, true).await;
        let order_id = seeded_order(&stores, true).await;

        let response = create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap();
        assert_eq!(response.status, DisbursementStatus::Pending);
        assert_eq!(response.notes.as_deref(), Some("pack fragile"));
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].product_id, "1");
        assert_eq!(response.items[0].quantity, 2);
        assert_eq!(response.items[0].picked_quantity, 0);
        assert_eq!(response.warehouse.unwrap().code, warehouse.code);

        let order = orders::order_by_id(&stores, order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_creation_requires_a_confirmed_order() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, true).await;
        let order_id = seeded_order(&stores, false).await;

        let err = create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap_err();
        match err {
            ApiError::BadRequest(message) => assert!(message.contains("CONFIRMED")),
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_disbursement_for_an_order_is_rejected() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, true).await;
        let order_id = seeded_order(&stores, true).await;

        create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap();
        let err = create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap_err();
        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "Order already has a disbursement");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inactive_warehouses_cannot_receive_work() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, false).await;
        let order_id = seeded_order(&stores, true).await;

        let err = create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_completing_stamps_the_time_and_keeps_the_order_processing() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, true).await;
        let order_id = seeded_order(&stores, true).await;
        let created = create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap();

        let moved = update_status(&stores, created.id, DisbursementStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(moved.status, DisbursementStatus::InProgress);
        assert!(moved.completed_at.is_none());

        let done = update_status(&stores, created.id, DisbursementStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, DisbursementStatus::Completed);
        assert!(done.completed_at.is_some());

        let order = orders::order_by_id(&stores, order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_pending_is_not_a_valid_target_status() {
        let stores = Stores::in_memory();
        let err = update_status(&stores, Uuid::new_v4(), DisbursementStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_listing_joins_warehouse_order_and_product_names() {
        let stores = Stores::in_memory();
        let warehouse = seeded_warehouse(&stores, true).await;
        let order_id = seeded_order(&stores, true).await;
        create_disbursement(&stores, request(order_id, warehouse.id))
            .await
            .unwrap();

        let rows = list_disbursements(&stores, ListQuery::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.warehouse.as_ref().unwrap().id, warehouse.id);
        let order = row.order.as_ref().unwrap();
        assert_eq!(order.id, order_id);
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(
            row.items[0].product_name.as_deref(),
            Some("iPhone 15 Pro Max")
        );
    }

    #[tokio::test]
    async fn test_list_filters_narrow_by_warehouse_and_status() {
        let stores = Stores::in_memory();
        let first = seeded_warehouse(&stores, true).await;
        let second = seeded_warehouse(&stores, true).await;

        let order_a = seeded_order(&stores, true).await;
        let order_b = seeded_order(&stores, true).await;
        let a = create_disbursement(&stores, request(order_a, first.id))
            .await
            .unwrap();
        create_disbursement(&stores, request(order_b, second.id))
            .await
            .unwrap();
        update_status(&stores, a.id, DisbursementStatus::Completed)
            .await
            .unwrap();

        let by_warehouse = list_disbursements(
            &stores,
            ListQuery {
                warehouse_id: Some(first.id.to_string()),
                status: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(by_warehouse.len(), 1);
        assert_eq!(by_warehouse[0].warehouse_id, first.id);

        let completed = list_disbursements(
            &stores,
            ListQuery {
                warehouse_id: None,
                status: Some("COMPLETED".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, a.id);

        let nonsense = list_disbursements(
            &stores,
            ListQuery {
                warehouse_id: Some("not-a-uuid".to_string()),
                status: None,
            },
        )
        .await
        .unwrap();
        assert!(nonsense.is_empty());
    }
}
