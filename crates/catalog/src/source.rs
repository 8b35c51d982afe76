//! Catalog sources: one capability, two backings.
//!
//! [`LocalCatalog`] keeps the product list in local persisted state;
//! [`RemoteCatalog`] merges the seed catalog with the remote document store.
//! The application picks one at startup and talks to it through
//! [`CatalogSource`] only.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use storefront_core::{CategoryId, ProductId};
use storefront_storage::{DocumentStore, KeyValueStore, StateKey, read_json, write_json};

use crate::category::{Category, CategoryIndex};
use crate::error::CatalogError;
use crate::product::{Product, ProductDraft};
use crate::reconcile::{CatalogReconciler, CatalogSnapshot, filter_by_category, merge};
use crate::registry::CategoryRegistry;
use crate::seed::local_defaults;

/// Which backing a source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
        }
    }
}

/// Read/write access to the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Categories a list can be filtered by.
    async fn categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Display-ready product list, optionally filtered by category.
    async fn list(&self, filter: Option<&CategoryId>) -> Result<CatalogSnapshot, CatalogError>;

    /// What to show when `list` failed to reach its backing store.
    fn fallback(&self, filter: Option<&CategoryId>) -> CatalogSnapshot;

    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError>;

    async fn add(&self, draft: ProductDraft) -> Result<Product, CatalogError>;

    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<Product, CatalogError>;

    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Local
// ─────────────────────────────────────────────────────────────────────────────

/// Product list stored whole under the `"products"` key.
///
/// Every write reads the full list, changes it in memory and writes it back.
#[derive(Debug)]
pub struct LocalCatalog<K> {
    store: K,
}

impl<K: KeyValueStore> LocalCatalog<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Stored products; the defaults are written on first read.
    pub async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let stored: Option<Vec<Product>> = read_json(&self.store, StateKey::Products)
            .await
            .map_err(CatalogError::LocalStorage)?;

        match stored {
            Some(products) => Ok(products),
            None => {
                let defaults = local_defaults();
                self.save(&defaults).await?;
                tracing::info!(count = defaults.len(), "local catalog initialised with defaults");
                Ok(defaults)
            }
        }
    }

    async fn save(&self, products: &[Product]) -> Result<(), CatalogError> {
        write_json(&self.store, StateKey::Products, products)
            .await
            .map_err(CatalogError::LocalStorage)
    }

    fn labels(products: &[Product]) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for product in products {
            let label = product.category.trim();
            if categories.iter().any(|c| c.name == label) {
                continue;
            }
            if let Some(category) = Category::label(label) {
                categories.push(category);
            }
        }
        categories
    }

    /// Millisecond timestamp id, bumped past any id already in use.
    fn next_id(products: &[Product]) -> Result<ProductId, CatalogError> {
        let mut candidate = Utc::now().timestamp_millis();
        while products.iter().any(|p| p.id.as_str() == candidate.to_string()) {
            candidate += 1;
        }
        Ok(ProductId::new(candidate.to_string())?)
    }
}

#[async_trait]
impl<K: KeyValueStore> CatalogSource for LocalCatalog<K> {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(Self::labels(&self.load().await?))
    }

    async fn list(&self, filter: Option<&CategoryId>) -> Result<CatalogSnapshot, CatalogError> {
        let products = self.load().await?;
        let index = CategoryIndex::new(&Self::labels(&products));

        // Local categories are free-text labels; the filter id is the label.
        let name = filter.map(CategoryId::as_str);
        let selected = match name {
            Some(name) => filter_by_category(&products, name, &index),
            None => products,
        };

        Ok(CatalogSnapshot {
            filter: filter.cloned(),
            category_name: name.map(str::to_string),
            products: merge(selected, Vec::new(), &index),
        })
    }

    fn fallback(&self, filter: Option<&CategoryId>) -> CatalogSnapshot {
        CatalogSnapshot::empty(filter.cloned())
    }

    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.load()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    async fn add(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut products = self.load().await?;
        let product = Product::from_draft(Self::next_id(&products)?, draft);
        products.push(product.clone());
        self.save(&products).await?;

        tracing::info!(id = %product.id, "product added to local catalog");
        Ok(product)
    }

    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<Product, CatalogError> {
        let mut products = self.load().await?;
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;
        product.apply_draft(draft);
        let updated = product.clone();
        self.save(&products).await?;

        tracing::info!(id = %id, "local product updated");
        Ok(updated)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        let mut products = self.load().await?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Err(CatalogError::NotFound(format!("product {id}")));
        }
        self.save(&products).await?;

        tracing::info!(id = %id, "local product deleted");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Remote
// ─────────────────────────────────────────────────────────────────────────────

/// Seed catalog + remote product collection + category registry.
///
/// Seed products are read-only: edits and deletes address the remote
/// collection only.
#[derive(Debug)]
pub struct RemoteCatalog<S> {
    reconciler: CatalogReconciler<S>,
    registry: CategoryRegistry<S>,
    last_index: RwLock<CategoryIndex>,
}

impl<S: DocumentStore + Clone> RemoteCatalog<S> {
    pub fn new(
        store: S,
        products_collection: &str,
        categories_collection: &str,
        seed: Vec<Product>,
    ) -> Self {
        Self {
            reconciler: CatalogReconciler::new(store.clone(), products_collection, seed),
            registry: CategoryRegistry::new(store, categories_collection),
            last_index: RwLock::new(CategoryIndex::default()),
        }
    }
}

impl<S: DocumentStore> RemoteCatalog<S> {
    pub fn registry(&self) -> &CategoryRegistry<S> {
        &self.registry
    }

    /// Fetch the registry and remember it for offline fallbacks.
    async fn refresh_index(&self) -> Result<CategoryIndex, CatalogError> {
        let index = self.registry.index().await?;
        if let Ok(mut last) = self.last_index.write() {
            *last = index.clone();
        }
        Ok(index)
    }

    fn cached_index(&self) -> CategoryIndex {
        self.last_index
            .read()
            .map(|index| index.clone())
            .unwrap_or_default()
    }

    /// Store the registry id when the draft names a known category.
    fn normalize_category(draft: ProductDraft, index: &CategoryIndex) -> ProductDraft {
        match index.id_for_name(&draft.category) {
            Some(id) => {
                let id = id.to_string();
                draft.with_category(id)
            }
            None => draft,
        }
    }

    fn store(&self) -> &S {
        self.reconciler.store()
    }

    fn collection(&self) -> &str {
        self.reconciler.collection()
    }
}

#[async_trait]
impl<S: DocumentStore> CatalogSource for RemoteCatalog<S> {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.registry.list().await
    }

    async fn list(&self, filter: Option<&CategoryId>) -> Result<CatalogSnapshot, CatalogError> {
        let index = self.refresh_index().await?;
        self.reconciler.reconcile(filter, &index).await
    }

    fn fallback(&self, filter: Option<&CategoryId>) -> CatalogSnapshot {
        self.reconciler.seed_snapshot(filter, &self.cached_index())
    }

    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.reconciler.seed().iter().find(|p| &p.id == id) {
            return Ok(product.clone());
        }
        self.list(None)
            .await?
            .products
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    async fn add(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let index = self.refresh_index().await?;
        let draft = Self::normalize_category(draft, &index);

        // The store assigns the id; build the fields from a placeholder-id record.
        let pending = Product::from_draft(ProductId::new("pending")?, draft);
        let doc = self
            .store()
            .insert(self.collection(), pending.to_fields()?)
            .await
            .map_err(CatalogError::RemoteWrite)?;

        let product = Product {
            id: ProductId::new(doc.id)?,
            ..pending
        };
        tracing::info!(id = %product.id, "product added to remote catalog");
        Ok(product)
    }

    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<Product, CatalogError> {
        let index = self.refresh_index().await?;
        let draft = Self::normalize_category(draft, &index);

        if self.reconciler.seed().iter().any(|p| &p.id == id) {
            return Err(CatalogError::validation("Sample products cannot be edited"));
        }
        let mut product = self.get(id).await?;
        product.apply_draft(draft);

        self.store()
            .update(self.collection(), id.as_str(), product.to_fields()?)
            .await
            .map_err(CatalogError::remote_write)?;
        tracing::info!(id = %id, "remote product updated");
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        if self.reconciler.seed().iter().any(|p| &p.id == id) {
            return Err(CatalogError::validation("Sample products cannot be deleted"));
        }
        self.store()
            .delete(self.collection(), id.as_str())
            .await
            .map_err(CatalogError::remote_write)?;
        tracing::info!(id = %id, "remote product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductForm;
    use crate::seed::{DEFAULT_CATEGORIES, seed_catalog};
    use crate::{CATEGORIES_COLLECTION, PRODUCTS_COLLECTION};
    use std::sync::Arc;
    use storefront_storage::{InMemoryDocumentStore, InMemoryKeyValueStore};

    fn draft(name: &str, price: &str, category: &str) -> ProductDraft {
        ProductDraft::from_form(&ProductForm {
            name: name.into(),
            price: price.into(),
            description: "desc".into(),
            category: category.into(),
            image: String::new(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn local_catalog_seeds_defaults_on_first_load() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let catalog = LocalCatalog::new(store.clone());

        let snapshot = catalog.list(None).await.unwrap();
        assert_eq!(snapshot.len(), local_defaults().len());
        assert!(store.get(StateKey::Products).await.unwrap().is_some());

        let names: Vec<_> = snapshot.products.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(names, vec!["Electronics", "Electronics", "Fashion", "Home"]);
    }

    #[tokio::test]
    async fn local_catalog_crud_round_trip() {
        let catalog = LocalCatalog::new(InMemoryKeyValueStore::new());

        let added = catalog.add(draft("Lamp", "20", "Home")).await.unwrap();
        assert_eq!(catalog.get(&added.id).await.unwrap().name, "Lamp");

        let updated = catalog.update(&added.id, draft("Desk Lamp", "25", "Home")).await.unwrap();
        assert_eq!(updated.name, "Desk Lamp");

        let home = CategoryId::new("Home").unwrap();
        assert_eq!(catalog.list(Some(&home)).await.unwrap().len(), 2);

        catalog.delete(&added.id).await.unwrap();
        assert!(matches!(
            catalog.delete(&added.id).await.unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn local_ids_do_not_collide() {
        let catalog = LocalCatalog::new(InMemoryKeyValueStore::new());
        let a = catalog.add(draft("A", "1", "X")).await.unwrap();
        let b = catalog.add(draft("B", "1", "X")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    fn remote(store: Arc<InMemoryDocumentStore>) -> RemoteCatalog<Arc<InMemoryDocumentStore>> {
        RemoteCatalog::new(store, PRODUCTS_COLLECTION, CATEGORIES_COLLECTION, seed_catalog())
    }

    #[tokio::test]
    async fn remote_add_stores_the_category_identifier() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let catalog = remote(store.clone());
        let categories = catalog.registry().bootstrap(&DEFAULT_CATEGORIES).await.unwrap();
        let tv = categories.iter().find(|c| c.name == "TV").unwrap();

        let added = catalog.add(draft("OLED 55", "1499", "TV")).await.unwrap();
        assert_eq!(added.category, tv.id.as_str());

        let snapshot = catalog.list(Some(&tv.id)).await.unwrap();
        let ids: Vec<_> = snapshot.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["5", added.id.as_str()]);
    }

    #[tokio::test]
    async fn remote_seed_products_are_read_only() {
        let catalog = remote(Arc::new(InMemoryDocumentStore::new()));
        let seed_id = ProductId::new("1").unwrap();

        assert!(catalog.delete(&seed_id).await.unwrap_err().is_validation());
        assert!(
            catalog
                .update(&seed_id, draft("X", "1", "Shoes"))
                .await
                .unwrap_err()
                .is_validation()
        );
    }

    #[tokio::test]
    async fn remote_update_and_delete_address_the_document() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let catalog = remote(store.clone());

        let added = catalog.add(draft("Speaker", "80", "Audio")).await.unwrap();
        let updated = catalog.update(&added.id, draft("Big Speaker", "90", "Audio")).await.unwrap();
        assert_eq!(catalog.get(&added.id).await.unwrap(), updated);

        catalog.delete(&added.id).await.unwrap();
        assert_eq!(store.count(PRODUCTS_COLLECTION), 0);
        assert!(matches!(
            catalog.delete(&added.id).await.unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn remote_fallback_uses_the_last_known_registry() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let catalog = remote(store.clone());
        let categories = catalog.registry().bootstrap(&DEFAULT_CATEGORIES).await.unwrap();
        let shoes = categories.iter().find(|c| c.name == "Shoes").unwrap();

        // Before any list the registry is unknown, so a filtered fallback is empty.
        assert!(catalog.fallback(Some(&shoes.id)).is_empty());

        catalog.list(None).await.unwrap();
        let fallback = catalog.fallback(Some(&shoes.id));
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback.products[0].name, "Nike Air Max");
        assert_eq!(catalog.fallback(None).len(), seed_catalog().len());
    }
}
