//! Catalog reconciliation: seed + remote → one ordered, de-duplicated list.
//!
//! Contract for one call:
//! 1. Resolve the filter (a category id) to its registry display name.
//! 2. Query the remote store for that name and for every registry id that
//!    carries it, or fetch everything when there is no filter.
//! 3. Filter the seed catalog by the same name.
//! 4. Concatenate seed then remote and keep the first product per id.
//! 5. Stable-sort by resolved category name (locale order).
//!
//! Neither the seed nor the store is modified. A failed remote fetch fails
//! the whole call; there is no retry and no partial result.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use storefront_core::{CategoryId, Entity, locale_cmp};
use storefront_storage::{Document, DocumentStore};

use crate::category::CategoryIndex;
use crate::error::CatalogError;
use crate::product::Product;

/// Ordered, display-ready result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    pub filter: Option<CategoryId>,
    pub category_name: Option<String>,
    pub products: Vec<Product>,
}

impl CatalogSnapshot {
    pub fn empty(filter: Option<CategoryId>) -> Self {
        Self {
            filter,
            category_name: None,
            products: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Keep the first entity per identifier, preserving order.
pub fn dedupe_by_id<T: Entity>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect()
}

/// Products whose category reference resolves to `name`.
pub fn filter_by_category<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    name: &str,
    index: &CategoryIndex,
) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| index.resolve(&p.category) == name)
        .cloned()
        .collect()
}

/// Concatenate, de-duplicate (first wins) and sort by category display name.
pub fn merge(seed: Vec<Product>, remote: Vec<Product>, index: &CategoryIndex) -> Vec<Product> {
    let mut merged = dedupe_by_id(seed.into_iter().chain(remote));
    merged.sort_by(|a, b| locale_cmp(index.resolve(&a.category), index.resolve(&b.category)));
    merged
}

/// Resolve a filter id against the registry.
pub fn resolve_filter<'a>(
    filter: Option<&CategoryId>,
    index: &'a CategoryIndex,
) -> Result<Option<&'a str>, CatalogError> {
    match filter {
        None => Ok(None),
        Some(id) => index
            .name_of(id)
            .map(Some)
            .ok_or_else(|| CatalogError::UnknownCategory(id.clone())),
    }
}

/// Decode remote documents, skipping records that do not fit the product shape.
pub fn decode_products(collection: &str, docs: &[Document]) -> Vec<Product> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<Product>() {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::warn!(collection, id = %doc.id, error = %err, "skipping malformed product document");
                None
            }
        })
        .collect()
}

/// Merges a static seed catalog with a remote product collection.
#[derive(Debug, Clone)]
pub struct CatalogReconciler<S> {
    store: S,
    collection: String,
    seed: Vec<Product>,
}

impl<S: DocumentStore> CatalogReconciler<S> {
    pub fn new(store: S, collection: impl Into<String>, seed: Vec<Product>) -> Self {
        Self {
            store,
            collection: collection.into(),
            seed,
        }
    }

    pub fn seed(&self) -> &[Product] {
        &self.seed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Reconcile seed and remote products for `filter`.
    pub async fn reconcile(
        &self,
        filter: Option<&CategoryId>,
        index: &CategoryIndex,
    ) -> Result<CatalogSnapshot, CatalogError> {
        let name = resolve_filter(filter, index)?;
        let remote = self.fetch_remote(name, index).await?;

        let seed = match name {
            Some(name) => filter_by_category(&self.seed, name, index),
            None => self.seed.clone(),
        };
        // Remote records stored under a label that is neither the filter's
        // name nor its id still resolve through the index; drop mismatches.
        let remote = match name {
            Some(name) => filter_by_category(&remote, name, index),
            None => remote,
        };

        let products = merge(seed, remote, index);
        tracing::debug!(
            filter = ?filter.map(CategoryId::as_str),
            count = products.len(),
            "catalog reconciled"
        );

        Ok(CatalogSnapshot {
            filter: filter.cloned(),
            category_name: name.map(str::to_string),
            products,
        })
    }

    /// The seed-only view for `filter`, used when the remote store is unreachable.
    pub fn seed_snapshot(&self, filter: Option<&CategoryId>, index: &CategoryIndex) -> CatalogSnapshot {
        let name = match filter {
            Some(id) => match index.name_of(id) {
                Some(name) => Some(name),
                None => return CatalogSnapshot::empty(filter.cloned()),
            },
            None => None,
        };
        let seed = match name {
            Some(name) => filter_by_category(&self.seed, name, index),
            None => self.seed.clone(),
        };

        CatalogSnapshot {
            filter: filter.cloned(),
            category_name: name.map(str::to_string),
            products: merge(seed, Vec::new(), index),
        }
    }

    async fn fetch_remote(
        &self,
        name: Option<&str>,
        index: &CategoryIndex,
    ) -> Result<Vec<Product>, CatalogError> {
        let collection = self.collection.as_str();
        let docs = match name {
            Some(name) => {
                // The literal name plus every registry id carrying that name.
                let mut references = vec![name];
                for id in index.ids_for_name(name) {
                    if !references.contains(&id.as_str()) {
                        references.push(id.as_str());
                    }
                }
                let mut docs = Vec::new();
                for reference in references {
                    let matched = self
                        .store
                        .fetch_where(collection, "category", &Value::String(reference.to_string()))
                        .await
                        .map_err(CatalogError::RemoteFetch)?;
                    docs.extend(matched);
                }
                docs
            }
            None => self
                .store
                .fetch_all(collection)
                .await
                .map_err(CatalogError::RemoteFetch)?,
        };

        Ok(decode_products(collection, &docs))
    }
}
