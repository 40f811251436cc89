use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle. The happy path is PENDING -> CONFIRMED -> PROCESSING ->
/// SHIPPED -> DELIVERED. This service only ever writes PENDING (checkout),
/// CONFIRMED (payment approved) and PROCESSING (sent to a warehouse);
/// SHIPPED, DELIVERED, CANCELLED and REFUNDED are modeled for data read
/// from elsewhere and have no transition endpoint here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "CONFIRMED")]
    Confirmed,
    #[sqlx(rename = "PROCESSING")]
    Processing,
    #[sqlx(rename = "SHIPPED")]
    Shipped,
    #[sqlx(rename = "DELIVERED")]
    Delivered,
    #[sqlx(rename = "CANCELLED")]
    Cancelled,
    #[sqlx(rename = "REFUNDED")]
    Refunded,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        };
        write!(f, "{}", s)
    }
}

/// Checkout contact and delivery details. Every field is optional; the
/// caller sends whatever the checkout form collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governorate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One line of an order, snapshotted at checkout. The product id is the
/// resolved catalog id when the catalog knows the product, otherwise the
/// raw id the caller sent; name and price are always the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Catalog product id, possibly dangling
    pub product_id: String,

    /// Product name at purchase time
    pub name: String,

    /// Unit price at purchase time
    pub price: Decimal,

    /// Units ordered
    pub quantity: i32,

    /// Optional product image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Optional selected color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A customer order with its item lines.
///
/// Totals are persisted exactly as the caller supplied them; the service
/// never recomputes `total` from `subtotal + shipping + tax`.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique identifier for the order
    pub id: Uuid,

    /// Owning account, absent for guest checkout
    pub user_id: Option<Uuid>,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Sum of item lines, as supplied
    pub subtotal: Decimal,

    /// Shipping cost, as supplied
    pub shipping: Decimal,

    /// Tax amount, as supplied
    pub tax: Decimal,

    /// Grand total, as supplied
    pub total: Decimal,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Checkout contact and delivery details
    pub shipping_address: ShippingAddress,

    /// Carrier tracking number, set outside this service
    pub tracking_number: Option<String>,

    /// When payment was approved
    pub paid_at: Option<DateTime<Utc>>,

    /// When the order left the warehouse, set outside this service
    pub shipped_at: Option<DateTime<Utc>>,

    /// Timestamp when the order was created
    pub created_at: DateTime<Utc>,

    /// Item lines, immutable after creation
    pub items: Vec<OrderItem>,
}

/// Checkout request body. Field presence is validated by the handler so
/// the response can name everything that is missing at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Option<Vec<CreateOrderItem>>,
    pub subtotal: Option<Decimal>,
    pub shipping: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
    pub currency: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}

/// One requested item line at checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
    pub color: Option<String>,
}

/// Order projection returned to customers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    pub items: Vec<OrderItem>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            status: order.status,
            subtotal: order.subtotal,
            shipping: order.shipping,
            tax: order.tax,
            total: order.total,
            currency: order.currency,
            created_at: order.created_at,
            paid_at: order.paid_at,
            shipped_at: order.shipped_at,
            tracking_number: order.tracking_number,
            shipping_address: None,
            items: order.items,
        }
    }
}

impl OrderResponse {
    /// Single-order projection, including the shipping address.
    pub fn detailed(order: Order) -> Self {
        let address = order.shipping_address.clone();
        let mut response = OrderResponse::from(order);
        response.shipping_address = Some(address);
        response
    }
}

/// Disbursement summary attached to rows of the admin order list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDisbursementSummary {
    pub id: Uuid,
    pub status: crate::models::disbursement::DisbursementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_code: Option<String>,
}

/// Order row in the admin back-office list: customer contact flattened out
/// of the shipping address, plus the disbursement summary when one exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disbursement: Option<OrderDisbursementSummary>,
}

/// Acknowledgement for marking an order paid. The customer phone is
/// surfaced so back-office staff can send the payment confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidResponse {
    pub ok: bool,
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
    }

    #[test]
    fn test_shipping_address_accepts_partial_bodies() {
        let addr: ShippingAddress =
            serde_json::from_str(r#"{"fullName":"Sara","phone":"+20100000000"}"#).unwrap();
        assert_eq!(addr.full_name.as_deref(), Some("Sara"));
        assert_eq!(addr.phone.as_deref(), Some("+20100000000"));
        assert!(addr.country.is_none());
    }

    #[test]
    fn test_empty_shipping_address_serializes_as_empty_object() {
        let addr = ShippingAddress::default();
        assert_eq!(serde_json::to_string(&addr).unwrap(), "{}");
    }

    #[test]
    fn test_detailed_projection_carries_the_address() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: None,
            status: OrderStatus::Pending,
            subtotal: Decimal::from(200),
            shipping: Decimal::from(50),
            tax: Decimal::from(20),
            total: Decimal::from(270),
            currency: "EGP".to_string(),
            shipping_address: ShippingAddress {
                phone: Some("+20100000000".to_string()),
                ..Default::default()
            },
            tracking_number: None,
            paid_at: None,
            shipped_at: None,
            created_at: Utc::now(),
            items: vec![],
        };

        let plain = serde_json::to_value(OrderResponse::from(order.clone())).unwrap();
        assert!(plain.get("shippingAddress").is_none());

        let detailed = serde_json::to_value(OrderResponse::detailed(order)).unwrap();
        assert_eq!(detailed["shippingAddress"]["phone"], "+20100000000");
    }
}
