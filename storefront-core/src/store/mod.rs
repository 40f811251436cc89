use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::disbursement::{Disbursement, DisbursementFilter, DisbursementStatus};
use crate::models::order::{Order, OrderStatus};
use crate::models::product::{Category, Product, ProductFilter};
use crate::models::user::User;
use crate::models::warehouse::{Warehouse, WarehousePatch};

pub mod memory;
pub mod postgres;

/// Failure surfaced by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness or state guard rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True when the database cannot be reached at all, as opposed to a
    /// statement that failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Tls(_)
            )
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Conflict when the email is already registered.
    async fn create(&self, user: User) -> StoreResult<()>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    /// Looks a product up by id or slug.
    async fn find_product(&self, id_or_slug: &str) -> StoreResult<Option<Product>>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    /// Display names for the given product ids; unknown ids are absent.
    async fn product_names(&self, ids: &[String]) -> StoreResult<HashMap<String, String>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order and its items atomically.
    async fn create(&self, order: Order) -> StoreResult<()>;
    async fn find(&self, id: Uuid) -> StoreResult<Option<Order>>;
    /// The user's orders, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>>;
    /// Every order, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Order>>;
    /// Sets CONFIRMED and paid_at in one write, whatever the current
    /// status. Ok(None) when the order is unknown.
    async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> StoreResult<Option<Order>>;
    /// Unconditional status write; false when the order is unknown.
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<bool>;
}

#[async_trait]
pub trait WarehouseStore: Send + Sync {
    /// Conflict when the name or code is taken.
    async fn create(&self, warehouse: Warehouse) -> StoreResult<()>;
    /// All warehouses ordered by code.
    async fn list(&self) -> StoreResult<Vec<Warehouse>>;
    async fn find(&self, id: Uuid) -> StoreResult<Option<Warehouse>>;
    /// Applies the patch; Ok(None) when the id is unknown, Conflict when
    /// the new name or code is taken.
    async fn update(&self, id: Uuid, patch: WarehousePatch) -> StoreResult<Option<Warehouse>>;
}

#[async_trait]
pub trait DisbursementStore: Send + Sync {
    /// Persists the disbursement with its items and flips the order from
    /// CONFIRMED to PROCESSING, all as one atomic unit. Conflict when the
    /// order is not CONFIRMED at write time, with nothing persisted; this
    /// is what makes a second disbursement for the same order impossible
    /// even under concurrent requests.
    async fn create(&self, disbursement: Disbursement) -> StoreResult<()>;
    async fn find(&self, id: Uuid) -> StoreResult<Option<Disbursement>>;
    async fn find_by_order(&self, order_id: Uuid) -> StoreResult<Option<Disbursement>>;
    /// Matching disbursements, newest first.
    async fn list(&self, filter: &DisbursementFilter) -> StoreResult<Vec<Disbursement>>;
    /// Writes the status and completion timestamp; Ok(None) when the id
    /// is unknown.
    async fn set_status(
        &self,
        id: Uuid,
        status: DisbursementStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Disbursement>>;
}

#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn upsert(&self, key: &str, value: Value) -> StoreResult<()>;
}

/// Handles to every backing store. Production wires the Postgres bundle;
/// tests and catalog-only local runs use the seeded in-memory bundle.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub warehouses: Arc<dyn WarehouseStore>,
    pub disbursements: Arc<dyn DisbursementStore>,
    pub settings: Arc<dyn SettingStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Stores {
            users: store.clone(),
            catalog: store.clone(),
            orders: store.clone(),
            warehouses: store.clone(),
            disbursements: store.clone(),
            settings: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::with_default_catalog());
        Stores {
            users: store.clone(),
            catalog: store.clone(),
            orders: store.clone(),
            warehouses: store.clone(),
            disbursements: store.clone(),
            settings: store,
        }
    }
}
