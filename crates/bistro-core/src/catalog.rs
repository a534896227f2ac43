//! # Menu Catalog
//!
//! The product list consumed by the engine to price carts and orders.
//! The catalog itself (menu editing, images, rendering) belongs to an
//! external collaborator; the engine only needs `listProducts()` and a
//! price lookup by product id.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Stable product id (`p1`, `p2`, ...).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current price. Orders freeze the total at submission time, so a
    /// later price change never touches existing orders.
    pub price: Money,

    /// Menu section ("Principales", "Bebidas", ...).
    pub category: String,

    /// Image URL shown on the product card.
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
}

impl Product {
    fn demo(id: &str, name: &str, price: i64, category: &str, image: &str, description: &str) -> Self {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_units(price),
            category: category.to_string(),
            image: image.to_string(),
            description: Some(description.to_string()),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Ordered list of products with lookup by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates a catalog from an explicit product list.
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// The six-item BistrOS house menu.
    pub fn default_menu() -> Self {
        Catalog::new(vec![
            Product::demo(
                "p1",
                "BistrOS Burger",
                12500,
                "Principales",
                "https://images.unsplash.com/photo-1568901346375-23c9450c58cd?w=500&auto=format&fit=crop&q=60",
                "Hamburguesa premium con cheddar, panceta y salsa secreta.",
            ),
            Product::demo(
                "p2",
                "Papas Rústicas",
                6500,
                "Entradas",
                "https://images.unsplash.com/photo-1630384060421-cb20d0e0649d?w=500&auto=format&fit=crop&q=60",
                "Papas cortadas a mano con hierbas y dip de ajo.",
            ),
            Product::demo(
                "p3",
                "Cerveza IPA Artesanal",
                4500,
                "Bebidas",
                "https://images.unsplash.com/photo-1608270586620-248524c67de9?w=500&auto=format&fit=crop&q=60",
                "IPA lupulada con notas cítricas y amargor medio.",
            ),
            Product::demo(
                "p4",
                "Limonada Menta y Jengibre",
                3800,
                "Bebidas",
                "https://images.unsplash.com/photo-1513558161293-cdaf765ed2fd?w=500&auto=format&fit=crop&q=60",
                "Refrescante limonada casera con menta fresca.",
            ),
            Product::demo(
                "p5",
                "Tiramisú de la Casa",
                5500,
                "Postres",
                "https://images.unsplash.com/photo-1571877227200-a0d98ea607e9?w=500&auto=format&fit=crop&q=60",
                "Clásico italiano con mascarpone y café espresso.",
            ),
            Product::demo(
                "p6",
                "Wrap Vegetariano",
                10500,
                "Principales",
                "https://images.unsplash.com/photo-1626700051175-6818013e1d4f?w=500&auto=format&fit=crop&q=60",
                "Tortilla de trigo con vegetales asados y hummus.",
            ),
        ])
    }

    /// All products in menu order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    /// Current price of a product, `None` if it is not on the menu.
    pub fn price_of(&self, product_id: &str) -> Option<Money> {
        self.get(product_id).map(|p| p.price)
    }

    /// Menu sections in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }
}
