//! End-to-end flows over in-memory stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use storefront_app::{SharedDocuments, SharedState, Storefront, StorefrontConfig};
use storefront_auth::SignUpForm;
use storefront_catalog::ProductForm;
use storefront_storage::{
    Document, DocumentStore, Fields, InMemoryDocumentStore, InMemoryKeyValueStore, StoreError,
};

/// In-memory documents that can be switched off to simulate an outage.
#[derive(Default)]
struct SwitchableDocuments {
    inner: InMemoryDocumentStore,
    down: AtomicBool,
}

impl SwitchableDocuments {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Network("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SwitchableDocuments {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        self.check()?;
        self.inner.insert(collection, fields).await
    }
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check()?;
        self.inner.fetch_all(collection).await
    }
    async fn fetch_where(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        self.check()?;
        self.inner.fetch_where(collection, field, value).await
    }
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update(collection, id, fields).await
    }
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(collection, id).await
    }
}

fn config(backend: &str) -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_BACKEND" => Some(backend.to_string()),
        "STOREFRONT_DATA_PATH" => Some("/unused/state.db".to_string()),
        _ => None,
    })
    .unwrap()
}

async fn storefront(backend: &str, documents: SharedDocuments) -> Storefront {
    let state: SharedState = Arc::new(InMemoryKeyValueStore::new());
    Storefront::assemble_with_cost(config(backend), state, documents, 4)
        .await
        .unwrap()
}

fn form(name: &str, price: &str, category: &str) -> ProductForm {
    ProductForm {
        name: name.into(),
        price: price.into(),
        description: "Test product".into(),
        category: category.into(),
        image: String::new(),
    }
}

#[tokio::test]
async fn local_storefront_customer_and_admin_flow() {
    let shop = storefront("local", Arc::new(InMemoryDocumentStore::new())).await;

    let browser = shop.browser();
    let outcome = browser.refresh(None).await;
    assert_eq!(outcome.snapshot().unwrap().len(), 4);
    assert!(outcome.notice().is_none());

    shop.sign_up(&SignUpForm::new("shopper@example.com", "pw", "pw")).await.unwrap();
    shop.sign_in("shopper@example.com", "pw").await.unwrap();
    assert!(shop.admin().await.is_err());

    shop.provision_admin("admin@example.com", "root").await.unwrap();
    assert!(shop.sign_in_admin("shopper@example.com", "pw").await.is_err());
    let session = shop.sign_in_admin("admin@example.com", "root").await.unwrap();
    assert!(session.value.is_admin());

    let admin = shop.admin().await.unwrap();
    let added = admin.add_product(&form("Desk Lamp", "35", "Home")).await.unwrap();
    assert_eq!(added.notice.message, "Product added successfully!");

    browser.refresh(None).await;
    let hits = browser.search("lamp").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, added.value.id);

    shop.logout().await.unwrap();
    assert!(shop.session().is_none());
    assert!(shop.admin().await.is_err());
}

#[tokio::test]
async fn remote_storefront_merges_seed_and_falls_back_when_offline() {
    let documents = Arc::new(SwitchableDocuments::default());
    let shop = storefront("remote", documents.clone()).await;

    let categories = shop.bootstrap_categories().await.unwrap();
    assert_eq!(categories.len(), 6);
    let tv = categories.iter().find(|c| c.name == "TV").unwrap().id.clone();

    shop.provision_admin("admin@example.com", "root").await.unwrap();
    shop.sign_in_admin("admin@example.com", "root").await.unwrap();
    let admin = shop.admin().await.unwrap();

    // A bad price never reaches the store.
    let rejected = admin.add_product(&form("Widget", "abc", "TV")).await.unwrap_err();
    assert_eq!(rejected.message, "Please enter a valid price");

    let added = admin.add_product(&form("OLED 65", "1999", "TV")).await.unwrap().value;
    assert_eq!(added.category, tv.as_str());

    let browser = shop.browser();
    let online = browser.refresh(Some(&tv)).await;
    let names: Vec<_> = online.snapshot().unwrap().products.iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, vec!["Samsung 4K TV", "OLED 65"]);
    assert!(online.notice().is_none());

    documents.set_down(true);
    let offline = browser.refresh(Some(&tv)).await;
    let snapshot = offline.snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.products[0].name, "Samsung 4K TV");
    assert_eq!(offline.notice().unwrap().message, "Failed to load products");

    let everything = browser.refresh(None).await;
    assert_eq!(everything.snapshot().unwrap().len(), 6);
    assert!(everything.notice().unwrap().is_error());
}

#[tokio::test]
async fn promotion_applies_to_an_open_session() {
    let shop = storefront("local", Arc::new(InMemoryDocumentStore::new())).await;

    shop.sign_up(&SignUpForm::new("owner@example.com", "pw", "pw")).await.unwrap();
    shop.sign_in("owner@example.com", "pw").await.unwrap();
    assert!(shop.admin().await.is_err());

    shop.provision_admin("owner@example.com", "pw").await.unwrap();
    let admin = shop.admin().await.unwrap();
    assert!(shop.session().unwrap().is_admin());

    let added = admin.add_product(&form("Desk Fan", "20", "Home")).await.unwrap();
    assert_eq!(added.notice.message, "Product added successfully!");
}
