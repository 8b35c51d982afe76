//! Catalog domain module.
//!
//! Products, categories and the logic that turns the seed catalog plus the
//! remote store into a display-ready list:
//! - [`reconcile`]: merge seed + remote, de-duplicate by id, filter and sort
//!   by category display name.
//! - [`registry`]: the category collection, including the default-category
//!   bootstrap.
//! - [`source`]: one [`CatalogSource`] capability with a local-state and a
//!   remote-store implementation, chosen once at startup.

pub mod category;
pub mod detail;
pub mod error;
pub mod product;
pub mod reconcile;
pub mod registry;
pub mod search;
pub mod seed;
pub mod source;

pub use category::{Category, CategoryIndex};
pub use detail::{DetailParams, ProductDetail};
pub use error::CatalogError;
pub use product::{Product, ProductDraft, ProductForm};
pub use reconcile::{CatalogReconciler, CatalogSnapshot};
pub use registry::CategoryRegistry;
pub use search::search;
pub use source::{CatalogSource, LocalCatalog, RemoteCatalog, SourceKind};

/// Remote collection holding products.
pub const PRODUCTS_COLLECTION: &str = "Products";

/// Remote collection holding category records.
pub const CATEGORIES_COLLECTION: &str = "Categories";
