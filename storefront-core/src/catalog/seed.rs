use rust_decimal::Decimal;

use crate::models::product::{Category, Product, ProductColor, ProductSpec};

/// Built-in catalog used until merchandising tooling lands. The in-memory
/// store serves it directly; a fresh database can be seeded from it too.
pub fn default_categories() -> Vec<Category> {
    vec![
        category("iphone", "iPhone", "Powerful. Beautiful.", 8),
        category("ipad", "iPad", "Magic happens here.", 6),
        category("macbook", "MacBook", "Supercharged by Apple Silicon.", 6),
        category("watch", "Apple Watch", "The ultimate device for a healthy life.", 4),
        category("airpods", "AirPods", "Sound that surrounds you.", 4),
        category("accessories", "Accessories", "Chargers, cases, MagSafe & more.", 12),
    ]
}

pub fn default_products() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            slug: "iphone-15-pro-max".to_string(),
            name: "iPhone 15 Pro Max".to_string(),
            description: String::new(),
            category_id: "iphone".to_string(),
            category_name: "iPhone".to_string(),
            price: Decimal::from(1199),
            original_price: Some(Decimal::from(1299)),
            currency: "USD".to_string(),
            images: vec![unsplash("1592286927505-1def25e5df75")],
            rating: 4.8,
            review_count: 2543,
            specs: vec![
                ProductSpec {
                    label: "Display".to_string(),
                    value: "6.7\" Super Retina XDR".to_string(),
                },
                ProductSpec {
                    label: "Chip".to_string(),
                    value: "A17 Pro".to_string(),
                },
            ],
            colors: vec![ProductColor {
                name: "Black Titanium".to_string(),
                hex: "#1a1a1a".to_string(),
            }],
            in_stock: true,
            badge: Some("New".to_string()),
        },
        Product {
            id: "2".to_string(),
            slug: "iphone-15-pro".to_string(),
            name: "iPhone 15 Pro".to_string(),
            description: String::new(),
            category_id: "iphone".to_string(),
            category_name: "iPhone".to_string(),
            price: Decimal::from(999),
            original_price: Some(Decimal::from(1099)),
            currency: "USD".to_string(),
            images: vec![unsplash("1592286927505-1def25e5df75")],
            rating: 4.7,
            review_count: 1834,
            specs: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            badge: Some("New".to_string()),
        },
        Product {
            id: "3".to_string(),
            slug: "macbook-pro-16".to_string(),
            name: "MacBook Pro 16\"".to_string(),
            description: String::new(),
            category_id: "macbook".to_string(),
            category_name: "MacBook".to_string(),
            price: Decimal::from(3499),
            original_price: None,
            currency: "USD".to_string(),
            images: vec![unsplash("1517336714731-489689fd1ca8")],
            rating: 4.9,
            review_count: 1245,
            specs: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            badge: Some("Pro".to_string()),
        },
        Product {
            id: "8".to_string(),
            slug: "airpods-pro-2".to_string(),
            name: "AirPods Pro (2nd gen)".to_string(),
            description: String::new(),
            category_id: "airpods".to_string(),
            category_name: "AirPods".to_string(),
            price: Decimal::from(249),
            original_price: None,
            currency: "USD".to_string(),
            images: vec![unsplash("1505740420928-5e560c06d30e")],
            rating: 4.7,
            review_count: 3421,
            specs: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            badge: Some("Best Seller".to_string()),
        },
        Product {
            id: "9".to_string(),
            slug: "mag-safe-charger".to_string(),
            name: "MagSafe Charger".to_string(),
            description: String::new(),
            category_id: "accessories".to_string(),
            category_name: "Accessories".to_string(),
            price: Decimal::from(39),
            original_price: None,
            currency: "USD".to_string(),
            images: vec![unsplash("1583394838336-acd977736f90")],
            rating: 4.5,
            review_count: 4521,
            specs: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            badge: None,
        },
    ]
}

fn category(id: &str, name: &str, description: &str, product_count: i32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: id.to_string(),
        description: description.to_string(),
        image: None,
        product_count,
    }
}

fn unsplash(photo: &str) -> String {
    format!("https://images.unsplash.com/photo-{photo}?w=800&h=800&fit=crop")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_categories_exist() {
        let categories = default_categories();
        for product in default_products() {
            assert!(
                categories.iter().any(|c| c.id == product.category_id),
                "product {} references unknown category {}",
                product.id,
                product.category_id
            );
        }
    }

    #[test]
    fn test_slugs_are_unique() {
        let products = default_products();
        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                assert_ne!(a.slug, b.slug);
                assert_ne!(a.id, b.id);
            }
        }
    }
}
