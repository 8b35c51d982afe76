//! Local persisted state: a key/value byte-string store.
//!
//! Every value is a whole serialized document. Callers read the full value,
//! mutate it in memory and write the full value back; there is no partial
//! update and no optimistic-concurrency check, so the last writer wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// The fixed keys the storefront persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// Serialized product list of the local catalog.
    Products,
    /// Serialized list of registered user accounts.
    Users,
    /// Serialized session of the signed-in user.
    CurrentUser,
}

impl StateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Products => "products",
            StateKey::Users => "users",
            StateKey::CurrentUser => "currentUser",
        }
    }
}

impl core::fmt::Display for StateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte-string store addressed by [`StateKey`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the full value, `None` if the key was never written (or removed).
    async fn get(&self, key: StateKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the full value.
    async fn set(&self, key: StateKey, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove the key. Removing an absent key is not an error.
    async fn remove(&self, key: StateKey) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    async fn get(&self, key: StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: StateKey, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: StateKey) -> Result<(), StoreError> {
        (**self).remove(key).await
    }
}

/// Read and deserialize a JSON document stored under `key`.
pub async fn read_json<T, S>(store: &S, key: StateKey) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and replace the document under `key`.
pub async fn write_json<T, S>(store: &S, key: StateKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized + Sync,
    S: KeyValueStore + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    store.set(key, bytes).await
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    inner: RwLock<HashMap<StateKey, Vec<u8>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("state lock poisoned".to_string())
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&key).cloned())
    }

    async fn set(&self, key: StateKey, value: Vec<u8>) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&key);
        Ok(())
    }
}
