//! Product detail view input and derived presentation data.
//!
//! The list view hands a product to the detail view either as a whole record
//! or as loose string fields (route parameters). Both shapes are accepted and
//! normalized here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use storefront_core::{DomainError, DomainResult, Price, ProductId};

use crate::product::Product;

/// What the detail view receives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DetailParams {
    Product(Product),
    Fields(HashMap<String, String>),
}

impl DetailParams {
    /// Normalize into a product. Field maps need `id`, `name` and `price`.
    pub fn into_product(self) -> DomainResult<Product> {
        match self {
            DetailParams::Product(product) => Ok(product),
            DetailParams::Fields(mut fields) => {
                let mut take = |key: &str| fields.remove(key).unwrap_or_default();
                let id = ProductId::new(take("id"))?;
                let name = take("name");
                if name.trim().is_empty() {
                    return Err(DomainError::validation("product name is missing"));
                }
                let price = Price::parse(&take("price"))?;

                Ok(Product {
                    id,
                    name,
                    price,
                    image: take("image"),
                    description: take("description"),
                    category: take("category"),
                })
            }
        }
    }
}

impl From<Product> for DetailParams {
    fn from(product: Product) -> Self {
        DetailParams::Product(product)
    }
}

/// Static specification block shown under a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specifications {
    pub brand: String,
    pub model: String,
    pub in_stock: String,
    pub shipping: String,
}

/// Everything the detail view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub price_label: String,
    pub features: Vec<String>,
    pub specifications: Specifications,
}

const FEATURES: [&str; 4] = [
    "High-quality materials",
    "Premium finish",
    "1 year warranty",
    "Free shipping",
];

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        let brand = product
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            price_label: product.price.display(),
            features: FEATURES.iter().map(|s| s.to_string()).collect(),
            specifications: Specifications {
                brand,
                model: "2024 Edition".to_string(),
                in_stock: "Yes".to_string(),
                shipping: "2-3 business days".to_string(),
            },
            product,
        }
    }
}
