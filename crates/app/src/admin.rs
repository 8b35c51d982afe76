//! Admin workflows: product and category management with user notices.

use std::sync::Arc;

use storefront_catalog::{
    CatalogError, CatalogSource, Category, CategoryRegistry, Product, ProductDraft, ProductForm,
};
use storefront_core::{CategoryId, ProductId};

use crate::notice::{ActionResult, Completed, Notice};
use crate::storefront::SharedDocuments;

/// Admin actions over the selected catalog source.
///
/// Category management needs the remote registry; with the local source the
/// category actions report an error notice.
pub struct AdminConsole {
    source: Arc<dyn CatalogSource>,
    registry: Option<CategoryRegistry<SharedDocuments>>,
}

impl AdminConsole {
    pub fn new(source: Arc<dyn CatalogSource>, registry: Option<CategoryRegistry<SharedDocuments>>) -> Self {
        Self { source, registry }
    }

    /// Validate and add a product. Invalid input writes nothing.
    pub async fn add_product(&self, form: &ProductForm) -> ActionResult<Product> {
        let draft = validate(form)?;
        self.source
            .add(draft)
            .await
            .map(|p| Completed::with_success(p, "Product added successfully!"))
            .map_err(|err| failure(err, "Failed to add product"))
    }

    pub async fn update_product(&self, id: &ProductId, form: &ProductForm) -> ActionResult<Product> {
        let draft = validate(form)?;
        self.source
            .update(id, draft)
            .await
            .map(|p| Completed::with_success(p, "Product updated successfully!"))
            .map_err(|err| failure(err, "Failed to update product"))
    }

    pub async fn delete_product(&self, id: &ProductId) -> ActionResult<()> {
        self.source
            .delete(id)
            .await
            .map(|()| Completed::with_success((), "Product deleted successfully!"))
            .map_err(|err| failure(err, "Failed to delete product"))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, Notice> {
        self.source
            .categories()
            .await
            .map_err(|err| failure(err, "Failed to load categories"))
    }

    pub async fn add_category(&self, name: &str) -> ActionResult<Category> {
        self.registry()?
            .add(name)
            .await
            .map(|c| Completed::with_success(c, "Category added successfully!"))
            .map_err(|err| failure(err, "Failed to add category"))
    }

    pub async fn delete_category(&self, id: &CategoryId) -> ActionResult<()> {
        self.registry()?
            .delete(id)
            .await
            .map(|()| Completed::with_success((), "Category deleted successfully!"))
            .map_err(|err| failure(err, "Failed to delete category"))
    }

    fn registry(&self) -> Result<&CategoryRegistry<SharedDocuments>, Notice> {
        self.registry
            .as_ref()
            .ok_or_else(|| Notice::error("Categories can only be managed with the remote catalog"))
    }
}

fn validate(form: &ProductForm) -> Result<ProductDraft, Notice> {
    ProductDraft::from_form(form).map_err(|err| Notice::error(err.user_message()))
}

/// Validation and missing-record errors carry their own text; store failures
/// get the action's generic message.
fn failure(err: CatalogError, generic: &str) -> Notice {
    tracing::warn!(error = %err, "{generic}");
    match err {
        CatalogError::Validation(msg) => Notice::error(msg),
        CatalogError::NotFound(_) => Notice::error("The requested item no longer exists"),
        _ => Notice::error(generic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::seed::seed_catalog;
    use storefront_catalog::{CATEGORIES_COLLECTION, LocalCatalog, PRODUCTS_COLLECTION, RemoteCatalog};
    use storefront_storage::{InMemoryDocumentStore, InMemoryKeyValueStore, KeyValueStore, StateKey};

    fn form(name: &str, price: &str, category: &str) -> ProductForm {
        ProductForm {
            name: name.into(),
            price: price.into(),
            description: "A thing".into(),
            category: category.into(),
            image: String::new(),
        }
    }

    fn remote_console() -> (AdminConsole, Arc<InMemoryDocumentStore>) {
        let memory = Arc::new(InMemoryDocumentStore::new());
        let documents: SharedDocuments = memory.clone();
        let source = RemoteCatalog::new(documents.clone(), PRODUCTS_COLLECTION, CATEGORIES_COLLECTION, seed_catalog());
        let registry = CategoryRegistry::new(documents, CATEGORIES_COLLECTION);
        (AdminConsole::new(Arc::new(source), Some(registry)), memory)
    }

    #[tokio::test]
    async fn invalid_price_is_rejected_without_a_write() {
        let (console, memory) = remote_console();
        let notice = console.add_product(&form("Widget", "abc", "Shoes")).await.unwrap_err();

        assert_eq!(notice.message, "Please enter a valid price");
        assert_eq!(memory.count(PRODUCTS_COLLECTION), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let (console, _) = remote_console();
        let notice = console.add_product(&form("", "10", "Shoes")).await.unwrap_err();
        assert_eq!(notice.message, "Please fill in all required fields");
    }

    #[tokio::test]
    async fn product_lifecycle_reports_success_notices() {
        let (console, memory) = remote_console();

        let added = console.add_product(&form("Widget", "10", "Shoes")).await.unwrap();
        assert_eq!(added.notice.message, "Product added successfully!");
        assert_eq!(memory.count(PRODUCTS_COLLECTION), 1);

        let updated = console
            .update_product(&added.value.id, &form("Widget 2", "12", "Shoes"))
            .await
            .unwrap();
        assert_eq!(updated.value.name, "Widget 2");

        let deleted = console.delete_product(&added.value.id).await.unwrap();
        assert_eq!(deleted.notice.message, "Product deleted successfully!");

        let gone = console.delete_product(&added.value.id).await.unwrap_err();
        assert_eq!(gone.message, "The requested item no longer exists");
    }

    #[tokio::test]
    async fn category_management_round_trip() {
        let (console, _) = remote_console();
        console.add_category("Garden").await.unwrap();
        assert_eq!(
            console.add_category("  ").await.unwrap_err().message,
            "Category name cannot be empty"
        );

        let categories = console.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        console.delete_category(&categories[0].id).await.unwrap();
        assert!(console.categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_console_cannot_manage_categories() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let console = AdminConsole::new(Arc::new(LocalCatalog::new(store.clone())), None);

        assert!(console.add_category("Garden").await.unwrap_err().is_error());

        let notice = console.add_product(&form("Mug", "0", "Home")).await.unwrap_err();
        assert_eq!(notice.message, "Please enter a valid price");
        assert!(store.get(StateKey::Products).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_price_leaves_a_stored_local_catalog_untouched() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let catalog = Arc::new(LocalCatalog::new(store.clone()));
        let console = AdminConsole::new(catalog.clone(), None);

        let before = catalog.list(None).await.unwrap();
        assert!(!before.is_empty());
        let stored = store.get(StateKey::Products).await.unwrap().unwrap();

        let notice = console.add_product(&form("Mug", "abc", "Home")).await.unwrap_err();
        assert_eq!(notice.message, "Please enter a valid price");

        assert_eq!(catalog.list(None).await.unwrap(), before);
        assert_eq!(store.get(StateKey::Products).await.unwrap().unwrap(), stored);
    }
}
