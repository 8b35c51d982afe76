//! Static sample data shipped with the client.

use storefront_core::{Price, ProductId};

use crate::product::Product;

/// Placeholder used when a product is saved without an image.
pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=300&h=300&fit=crop";

/// Categories every registry is expected to contain.
pub const DEFAULT_CATEGORIES: [&str; 6] =
    ["Shoes", "Mobile", "Headphone", "Laptop", "TV", "Cosmetics"];

fn product(id: &str, name: &str, price: &str, image: &str, description: &str, category: &str) -> Product {
    Product {
        id: ProductId::new(id).unwrap_or_else(|_| unreachable!("seed ids are non-empty")),
        name: name.to_string(),
        price: Price::parse(price).unwrap_or_else(|_| unreachable!("seed prices are valid")),
        image: image.to_string(),
        description: description.to_string(),
        category: category.to_string(),
    }
}

/// Seed catalog merged with the remote store. Categories are literal names.
pub fn seed_catalog() -> Vec<Product> {
    vec![
        product(
            "1",
            "Nike Air Max",
            "129.99",
            "https://images.unsplash.com/photo-1542291026-7eec264c27ff",
            "Comfortable running shoes with air cushioning",
            "Shoes",
        ),
        product(
            "2",
            "iPhone 13 Pro",
            "999.99",
            "https://images.unsplash.com/photo-1511707171634-5f897ff02aa9",
            "Latest iPhone with pro camera system",
            "Mobile",
        ),
        product(
            "3",
            "Sony WH-1000XM4",
            "349.99",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e",
            "Premium noise-cancelling headphones",
            "Headphone",
        ),
        product(
            "4",
            "MacBook Pro",
            "1299.99",
            "https://images.unsplash.com/photo-1517336714731-489689fd1ca8",
            "Powerful laptop for professionals",
            "Laptop",
        ),
        product(
            "5",
            "Samsung 4K TV",
            "799.99",
            "https://images.unsplash.com/photo-1601944179066-29786cb9d32a",
            "Smart TV with crystal clear display",
            "TV",
        ),
        product(
            "6",
            "MAC Lipstick Collection",
            "49.99",
            "https://images.unsplash.com/photo-1586495777744-4413f21062fa",
            "Luxurious lipstick collection with vibrant, long-lasting colors",
            "Cosmetics",
        ),
    ]
}

/// Products written to local state the first time it is read empty.
pub fn local_defaults() -> Vec<Product> {
    vec![
        product(
            "1",
            "Wireless Headphones",
            "99.99",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=300&h=300&fit=crop",
            "High-quality wireless headphones with noise cancellation",
            "Electronics",
        ),
        product(
            "2",
            "Smart Watch",
            "199.99",
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=300&h=300&fit=crop",
            "Feature-rich smartwatch with health monitoring",
            "Electronics",
        ),
        product(
            "3",
            "Coffee Mug",
            "15.99",
            "https://images.unsplash.com/photo-1514228742587-6b1558fcf93a?w=300&h=300&fit=crop",
            "Ceramic coffee mug with beautiful design",
            "Home",
        ),
        product(
            "4",
            "Backpack",
            "49.99",
            "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=300&h=300&fit=crop",
            "Durable and stylish backpack for everyday use",
            "Fashion",
        ),
    ]
}
