//! Category registry: the remote collection of category records.

use serde_json::Value;
use storefront_core::CategoryId;
use storefront_storage::{DocumentStore, Fields};

use crate::category::{Category, CategoryIndex, MAX_NAME_LEN, NAME_FIELD};
use crate::error::CatalogError;

/// Category collection on the remote document store.
#[derive(Debug, Clone)]
pub struct CategoryRegistry<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> CategoryRegistry<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// All category records, in store order. Nameless records are skipped.
    pub async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        let docs = self
            .store
            .fetch_all(&self.collection)
            .await
            .map_err(CatalogError::RemoteFetch)?;

        Ok(docs
            .iter()
            .filter_map(|doc| {
                let category = Category::from_document(doc);
                if category.is_none() {
                    tracing::warn!(id = %doc.id, "skipping category document without a name");
                }
                category
            })
            .collect())
    }

    /// Lookup table over the current registry contents.
    pub async fn index(&self) -> Result<CategoryIndex, CatalogError> {
        Ok(CategoryIndex::new(&self.list().await?))
    }

    /// Ensure every default name exists, inserting the missing ones.
    ///
    /// Returns the registry contents after the inserts. A failed insert is
    /// logged and skipped so one bad write does not stop the others. No
    /// uniqueness is enforced by the store: two clients bootstrapping at the
    /// same time can both insert the same name.
    pub async fn bootstrap<N: AsRef<str>>(&self, defaults: &[N]) -> Result<Vec<Category>, CatalogError> {
        let mut categories = self.list().await?;
        let mut inserted = 0usize;

        for name in defaults {
            let name = name.as_ref().trim();
            if name.is_empty() || categories.iter().any(|c| c.name == name) {
                continue;
            }

            match self.insert(name).await {
                Ok(category) => {
                    tracing::info!(name, id = %category.id, "default category created");
                    categories.push(category);
                    inserted += 1;
                }
                Err(err) => {
                    tracing::warn!(name, error = %err, "failed to create default category");
                }
            }
        }

        tracing::info!(total = categories.len(), inserted, "category registry bootstrapped");
        Ok(categories)
    }

    /// Add a category by name (trimmed, 1..=50 characters).
    pub async fn add(&self, name: &str) -> Result<Category, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::validation("Category name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(CatalogError::validation(format!(
                "Category name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        self.insert(name).await
    }

    /// Delete a category record.
    pub async fn delete(&self, id: &CategoryId) -> Result<(), CatalogError> {
        self.store
            .delete(&self.collection, id.as_str())
            .await
            .map_err(CatalogError::remote_write)?;
        tracing::info!(id = %id, "category deleted");
        Ok(())
    }

    async fn insert(&self, name: &str) -> Result<Category, CatalogError> {
        let mut fields = Fields::new();
        fields.insert(NAME_FIELD.to_string(), Value::String(name.to_string()));

        let doc = self
            .store
            .insert(&self.collection, fields)
            .await
            .map_err(CatalogError::RemoteWrite)?;

        Category::from_document(&doc).ok_or_else(|| {
            CatalogError::RemoteWrite(storefront_storage::StoreError::Parse(format!(
                "inserted category {} came back without a name",
                doc.id
            )))
        })
    }
}
