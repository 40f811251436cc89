use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::order::{
    AdminOrderResponse, CreateOrderRequest, MarkPaidResponse, Order, OrderDisbursementSummary,
    OrderItem, OrderStatus,
};
use crate::store::Stores;

const CREATE_FIELDS_REQUIRED: &str = "items, subtotal, shipping, tax, total required";

/// Records a checkout as a PENDING order. Totals are stored as sent;
/// item product ids are resolved against the catalog (id or slug) and
/// kept verbatim when the catalog does not know them.
pub async fn create_order(
    stores: &Stores,
    user_id: Option<Uuid>,
    body: CreateOrderRequest,
) -> ApiResult<Order> {
    let items = body.items.unwrap_or_default();
    let (subtotal, shipping, tax, total) = match (body.subtotal, body.shipping, body.tax, body.total)
    {
        (Some(subtotal), Some(shipping), Some(tax), Some(total)) if !items.is_empty() => {
            (subtotal, shipping, tax, total)
        }
        _ => return Err(ApiError::bad_request(CREATE_FIELDS_REQUIRED)),
    };

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product_id = match stores.catalog.find_product(&item.product_id).await? {
            Some(product) => product.id,
            None => item.product_id,
        };
        lines.push(OrderItem {
            product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
            color: item.color,
        });
    }

    let order = Order {
        id: Uuid::new_v4(),
        user_id,
        status: OrderStatus::Pending,
        subtotal,
        shipping,
        tax,
        total,
        currency: body.currency.unwrap_or_else(|| "USD".to_string()),
        shipping_address: body.shipping_address.unwrap_or_default(),
        tracking_number: None,
        paid_at: None,
        shipped_at: None,
        created_at: Utc::now(),
        items: lines,
    };
    stores.orders.create(order.clone()).await?;
    Ok(order)
}

/// Marks an order paid: status CONFIRMED plus the payment timestamp.
/// Re-marking an already confirmed order just refreshes the timestamp.
pub async fn mark_paid(stores: &Stores, id: Uuid) -> ApiResult<MarkPaidResponse> {
    let order = stores
        .orders
        .mark_paid(id, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    Ok(MarkPaidResponse {
        ok: true,
        order_id: order.id,
        status: order.status,
        customer_phone: order.shipping_address.phone,
    })
}

pub async fn order_by_id(stores: &Stores, id: Uuid) -> ApiResult<Order> {
    stores
        .orders
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

pub async fn my_orders(stores: &Stores, user_id: Uuid) -> ApiResult<Vec<Order>> {
    Ok(stores.orders.list_by_user(user_id).await?)
}

/// Back-office order list: every order, newest first, with customer
/// contact pulled out of the shipping address and the disbursement
/// summary when a warehouse is already working the order.
pub async fn all_orders(stores: &Stores) -> ApiResult<Vec<AdminOrderResponse>> {
    let orders = stores.orders.list_all().await?;
    let warehouses: HashMap<Uuid, (String, String)> = stores
        .warehouses
        .list()
        .await?
        .into_iter()
        .map(|w| (w.id, (w.name, w.code)))
        .collect();

    let mut rows = Vec::with_capacity(orders.len());
    for order in orders {
        let disbursement = stores
            .disbursements
            .find_by_order(order.id)
            .await?
            .map(|d| {
                let warehouse = warehouses.get(&d.warehouse_id);
                OrderDisbursementSummary {
                    id: d.id,
                    status: d.status,
                    completed_at: d.completed_at,
                    warehouse_name: warehouse.map(|(name, _)| name.clone()),
                    warehouse_code: warehouse.map(|(_, code)| code.clone()),
                }
            });
        rows.push(AdminOrderResponse {
            id: order.id,
            status: order.status,
            subtotal: order.subtotal,
            shipping: order.shipping,
            tax: order.tax,
            total: order.total,
            currency: order.currency,
            created_at: order.created_at,
            paid_at: order.paid_at,
            customer_name: order.shipping_address.full_name,
            customer_phone: order.shipping_address.phone,
            customer_email: order.shipping_address.email,
            items: order.items,
            disbursement,
        });
    }
    Ok(rows)
}
