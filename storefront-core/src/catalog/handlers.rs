use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::product::{Category, Product, ProductFilter, ProductsResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<ProductsResponse>> {
    let filter = ProductFilter {
        category: query.category,
        query: query.q,
    };
    let products = state.stores.catalog.list_products(&filter).await?;
    let total = products.len();
    Ok(Json(ProductsResponse { products, total }))
}

/// GET /api/products/:id, where :id is either the product id or its slug.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .stores
        .catalog
        .find_product(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(product))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.stores.catalog.list_categories().await?;
    Ok(Json(categories))
}
