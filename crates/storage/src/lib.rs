//! `storefront-storage`
//!
//! **Responsibility:** the two stores the storefront talks to, behind traits.
//!
//! - [`KeyValueStore`]: local persisted state, a byte-string value per fixed
//!   key (`"products"`, `"users"`, `"currentUser"`), read and written whole.
//! - [`DocumentStore`]: the hosted document database, a set of schemaless
//!   collections with insert-with-autoid, fetch-all, equality-filter fetch,
//!   update and delete.
//!
//! Adapters: in-memory (tests/dev), SQLite (local state on disk) and the
//! Firestore REST API (remote catalog).

pub mod document;
pub mod error;
pub mod firestore;
pub mod kv;
pub mod sqlite;

pub use document::{Document, DocumentStore, Fields, InMemoryDocumentStore};
pub use error::StoreError;
pub use firestore::{FirestoreConfig, FirestoreDocumentStore};
pub use kv::{InMemoryKeyValueStore, KeyValueStore, StateKey, read_json, write_json};
pub use sqlite::SqliteKeyValueStore;
