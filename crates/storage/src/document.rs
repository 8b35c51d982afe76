//! Remote document store abstraction.
//!
//! Documents are schemaless key/value records. The store assigns ids on insert
//! and a creation timestamp; nothing enforces a shape server-side, so callers
//! decode documents into their own types and decide what to do with records
//! that do not fit.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// A stored document: store-assigned id, its fields and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub create_time: Option<DateTime<Utc>>,
}

impl Document {
    /// Decode the document into `T`.
    ///
    /// The document id is injected as the `"id"` field; a stale `"id"` stored
    /// inside the fields is overridden so updates and deletes address the
    /// same record the caller sees.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Borrow a single field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Collection-oriented document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document; the store assigns the id and creation time.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Fetch every document of a collection.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Fetch documents whose `field` equals `value`.
    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Overwrite the given fields of an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing id is a `NotFound` error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        (**self).insert(collection, fields).await
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).fetch_all(collection).await
    }

    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).fetch_where(collection, field, value).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        (**self).update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }
}

/// In-memory document store for tests/dev.
///
/// Collections keep insertion order, which makes fetch results deterministic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with a caller-chosen id (fixtures).
    pub fn put(&self, collection: &str, id: impl Into<String>, fields: Fields) {
        let doc = Document {
            id: id.into(),
            fields,
            create_time: Some(Utc::now()),
        };
        if let Ok(mut map) = self.collections.write() {
            let docs = map.entry(collection.to_string()).or_default();
            docs.retain(|d| d.id != doc.id);
            docs.push(doc);
        }
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|m| m.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("document store lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let doc = Document {
            id: uuid::Uuid::now_v7().simple().to_string(),
            fields,
            create_time: Some(Utc::now()),
        };
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        map.entry(collection.to_string()).or_default().push(doc.clone());
        Ok(doc)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let map = self.collections.read().map_err(|_| poisoned())?;
        Ok(map.get(collection).cloned().unwrap_or_default())
    }

    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let map = self.collections.read().map_err(|_| poisoned())?;
        Ok(map
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.fields.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let doc = map
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        doc.fields.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let docs = map
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}
