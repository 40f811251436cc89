//! Storefront core: catalog browsing, checkout, payment confirmation and
//! warehouse fulfillment behind one JSON API.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod disbursements;
pub mod error;
pub mod models;
pub mod orders;
pub mod settings;
pub mod store;
pub mod warehouses;


use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{optional_auth, require_admin, require_auth};
use crate::config::Config;
use crate::store::Stores;

/// Application state containing shared resources.
///
/// Handlers reach storage through the `Stores` trait objects, never a
/// concrete backend, so the whole API runs against Postgres or against
/// the seeded in-memory stores.
#[derive(Clone)]
pub struct AppState {
    /// Storage backends for every entity
    pub stores: Stores,
    /// Environment-derived settings
    pub config: Arc<Config>,
    /// PostgreSQL connection pool, absent when running on in-memory stores
    pub pool: Option<PgPool>,
}

/// Health check endpoint.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "storefront-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Database health check endpoint. Reports the backing store; a pool that
/// cannot answer `SELECT 1` turns into a 503.
async fn db_health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let pool = match &state.pool {
        Some(pool) => pool,
        None => {
            return Ok(Json(serde_json::json!({
                "status": "ok",
                "database": "in-memory"
            })))
        }
    };

    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        tracing::error!("Database health check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}

/// Creates the main application router.
///
/// Routes are grouped by the gate in front of them: public, token
/// required, token optional (checkout), and admin only.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .route("/api/auth/register", post(auth::handlers::register))
        .route("/api/auth/login", post(auth::handlers::login))
        .route("/api/auth/logout", post(auth::handlers::logout))
        .route("/api/categories", get(catalog::handlers::list_categories))
        .route("/api/products", get(catalog::handlers::list_products))
        .route("/api/products/:id", get(catalog::handlers::get_product))
        // Single-order lookup is deliberately public: the order id is the
        // capability, so payment links survive a lost session.
        .route("/api/orders/:id", get(orders::handlers::get_order))
        .route(
            "/api/settings/home-layout",
            get(settings::handlers::get_home_layout),
        )
        .route("/api/settings/theme", get(settings::handlers::get_site_theme));

    let authenticated = Router::new()
        .route("/api/auth/me", get(auth::handlers::me))
        .route("/api/orders/me", get(orders::handlers::my_orders))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let checkout = Router::new()
        .route("/api/orders", post(orders::handlers::create_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let admin = Router::new()
        .route("/api/orders/all", get(orders::handlers::all_orders))
        .route("/api/orders/:id/paid", patch(orders::handlers::mark_paid))
        .route(
            "/api/warehouses",
            get(warehouses::handlers::list_warehouses)
                .post(warehouses::handlers::create_warehouse),
        )
        .route(
            "/api/warehouses/:id",
            patch(warehouses::handlers::update_warehouse),
        )
        .route(
            "/api/disbursements",
            get(disbursements::handlers::list_disbursements)
                .post(disbursements::handlers::create_disbursement),
        )
        .route(
            "/api/disbursements/:id/status",
            patch(disbursements::handlers::update_status),
        )
        .route(
            "/api/settings/home-layout",
            patch(settings::handlers::update_home_layout),
        )
        .route(
            "/api/settings/theme",
            patch(settings::handlers::update_site_theme),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(checkout)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
