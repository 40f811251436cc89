use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One labelled specification line on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub label: String,
    pub value: String,
}

/// A selectable product color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductColor {
    pub name: String,
    pub hex: String,
}

/// Catalog product. Product ids are human-assigned strings; lookups accept
/// either the id or the slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Human-assigned identifier
    pub id: String,

    /// URL slug, unique across the catalog
    pub slug: String,

    /// Display name
    pub name: String,

    /// Long description shown on the product page
    #[serde(default)]
    pub description: String,

    /// Owning category id
    pub category_id: String,

    /// Denormalized category name, used by search
    pub category_name: String,

    /// Current price
    pub price: Decimal,

    /// Pre-discount price, when the product is on sale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Gallery image URLs
    pub images: Vec<String>,

    /// Average review rating
    pub rating: f64,

    /// Number of reviews behind the rating
    pub review_count: i32,

    /// Specification lines
    pub specs: Vec<ProductSpec>,

    /// Available colors
    pub colors: Vec<ProductColor>,

    /// Whether the product can currently be ordered
    pub in_stock: bool,

    /// Optional merchandising badge ("New", "Pro", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Catalog category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub product_count: i32,
}

/// Filters accepted by the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category id
    pub category: Option<String>,
    /// Case-insensitive substring over name and category name
    pub query: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category_id != category {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let q = query.to_lowercase();
            if !product.name.to_lowercase().contains(&q)
                && !product.category_name.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        true
    }
}

/// Wire shape of the product listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub total: usize,
}
