use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::seed;
use crate::models::disbursement::{Disbursement, DisbursementFilter, DisbursementStatus};
use crate::models::order::{Order, OrderStatus};
use crate::models::product::{Category, Product, ProductFilter};
use crate::models::user::User;
use crate::models::warehouse::{Warehouse, WarehousePatch};
use crate::store::{
    CatalogStore, DisbursementStore, OrderStore, SettingStore, StoreError, StoreResult, UserStore,
    WarehouseStore,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    orders: HashMap<Uuid, Order>,
    warehouses: HashMap<Uuid, Warehouse>,
    disbursements: HashMap<Uuid, Disbursement>,
    settings: HashMap<String, Value>,
}

/// In-memory store over every entity. One lock guards the whole state,
/// which lets the disbursement guard check and flip the order status as a
/// single atomic step, mirroring the Postgres transaction.
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Store preloaded with the default catalog.
    pub fn with_default_catalog() -> Self {
        MemoryStore {
            state: RwLock::new(MemoryState {
                categories: seed::default_categories(),
                products: seed::default_products(),
                ..MemoryState::default()
            }),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn find_product(&self, id_or_slug: &str) -> StoreResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id_or_slug || p.slug == id_or_slug)
            .cloned())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.clone())
    }

    async fn product_names(&self, ids: &[String]) -> StoreResult<HashMap<String, String>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, order: Order) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id, order);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == Some(user_id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> StoreResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> StoreResult<Option<Order>> {
        let mut state = self.state.write().await;
        Ok(state.orders.get_mut(&id).map(|order| {
            order.status = OrderStatus::Confirmed;
            order.paid_at = Some(paid_at);
            order.clone()
        }))
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl WarehouseStore for MemoryStore {
    async fn create(&self, warehouse: Warehouse) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state
            .warehouses
            .values()
            .any(|w| w.name == warehouse.name || w.code == warehouse.code)
        {
            return Err(StoreError::Conflict(
                "Warehouse name or code already exists".to_string(),
            ));
        }
        state.warehouses.insert(warehouse.id, warehouse);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Warehouse>> {
        let state = self.state.read().await;
        let mut warehouses: Vec<Warehouse> = state.warehouses.values().cloned().collect();
        warehouses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(warehouses)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Warehouse>> {
        let state = self.state.read().await;
        Ok(state.warehouses.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: WarehousePatch) -> StoreResult<Option<Warehouse>> {
        let mut state = self.state.write().await;
        if !state.warehouses.contains_key(&id) {
            return Ok(None);
        }
        let name_taken = patch
            .name
            .as_ref()
            .map_or(false, |name| {
                state.warehouses.values().any(|w| w.id != id && &w.name == name)
            });
        let code_taken = patch
            .code
            .as_ref()
            .map_or(false, |code| {
                state.warehouses.values().any(|w| w.id != id && &w.code == code)
            });
        if name_taken || code_taken {
            return Err(StoreError::Conflict(
                "Warehouse name or code already exists".to_string(),
            ));
        }
        let warehouse = match state.warehouses.get_mut(&id) {
            Some(warehouse) => warehouse,
            None => return Ok(None),
        };
        if let Some(name) = patch.name {
            warehouse.name = name;
        }
        if let Some(code) = patch.code {
            warehouse.code = code;
        }
        if let Some(address) = patch.address {
            warehouse.address = address;
        }
        if let Some(is_active) = patch.is_active {
            warehouse.is_active = is_active;
        }
        Ok(Some(warehouse.clone()))
    }
}

#[async_trait]
impl DisbursementStore for MemoryStore {
    async fn create(&self, disbursement: Disbursement) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&disbursement.order_id) {
            Some(order) if order.status == OrderStatus::Confirmed => {
                order.status = OrderStatus::Processing;
            }
            _ => {
                return Err(StoreError::Conflict(
                    "Order is no longer CONFIRMED".to_string(),
                ))
            }
        }
        state.disbursements.insert(disbursement.id, disbursement);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Disbursement>> {
        let state = self.state.read().await;
        Ok(state.disbursements.get(&id).cloned())
    }

    async fn find_by_order(&self, order_id: Uuid) -> StoreResult<Option<Disbursement>> {
        let state = self.state.read().await;
        Ok(state
            .disbursements
            .values()
            .find(|d| d.order_id == order_id)
            .cloned())
    }

    async fn list(&self, filter: &DisbursementFilter) -> StoreResult<Vec<Disbursement>> {
        let state = self.state.read().await;
        let mut disbursements: Vec<Disbursement> = state
            .disbursements
            .values()
            .filter(|d| {
                filter
                    .warehouse_id
                    .map_or(true, |warehouse_id| d.warehouse_id == warehouse_id)
                    && filter.status.map_or(true, |status| d.status == status)
            })
            .cloned()
            .collect();
        disbursements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(disbursements)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DisbursementStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Disbursement>> {
        let mut state = self.state.write().await;
        Ok(state.disbursements.get_mut(&id).map(|disbursement| {
            disbursement.status = status;
            if completed_at.is_some() {
                disbursement.completed_at = completed_at;
            }
            disbursement.clone()
        }))
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let state = self.state.read().await;
        Ok(state.settings.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: Value) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.settings.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::disbursement::DisbursementItem;
    use crate::models::order::ShippingAddress;

    fn order_with_status(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: None,
            status,
            subtotal: Decimal::from(200),
            shipping: Decimal::from(50),
            tax: Decimal::from(20),
            total: Decimal::from(270),
            currency: "EGP".to_string(),
            shipping_address: ShippingAddress::default(),
            tracking_number: None,
            paid_at: None,
            shipped_at: None,
            created_at: Utc::now(),
            items: vec![],
        }
    }

    fn disbursement_for(order_id: Uuid, warehouse_id: Uuid) -> Disbursement {
        Disbursement {
            id: Uuid::new_v4(),
            order_id,
            warehouse_id,
            status: DisbursementStatus::Pending,
            notes: None,
            completed_at: None,
            created_at: Utc::now(),
            items: vec![DisbursementItem {
                product_id: "1".to_string(),
                quantity: 2,
                picked_quantity: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_mark_paid_returns_none_for_unknown_order() {
        let store = MemoryStore::new();
        let result = store.mark_paid(Uuid::new_v4(), Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_disbursement_create_requires_confirmed_order() {
        let store = MemoryStore::new();
        let order = order_with_status(OrderStatus::Pending);
        let order_id = order.id;
        OrderStore::create(&store, order).await.unwrap();

        let result = DisbursementStore::create(
            &store,
            disbursement_for(order_id, Uuid::new_v4()),
        )
        .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.find_by_order(order_id).await.unwrap().is_none());
        assert_eq!(
            OrderStore::find(&store, order_id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_concurrent_disbursement_creates_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let order = order_with_status(OrderStatus::Confirmed);
        let order_id = order.id;
        OrderStore::create(&*store, order).await.unwrap();

        let warehouse_id = Uuid::new_v4();
        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                DisbursementStore::create(&*store, disbursement_for(order_id, warehouse_id)).await
            })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move {
                DisbursementStore::create(&*store, disbursement_for(order_id, warehouse_id)).await
            })
        };

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert!(first.is_ok() != second.is_ok());
        assert_eq!(
            OrderStore::find(&*store, order_id).await.unwrap().unwrap().status,
            OrderStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_warehouse_codes_are_unique() {
        let store = MemoryStore::new();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: "Cairo Main".to_string(),
            code: "CAI".to_string(),
            address: None,
            is_active: true,
            created_at: Utc::now(),
        };
        WarehouseStore::create(&store, warehouse.clone()).await.unwrap();

        let duplicate = Warehouse {
            id: Uuid::new_v4(),
            name: "Cairo Backup".to_string(),
            ..warehouse
        };
        let result = WarehouseStore::create(&store, duplicate).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }
}
