//! Catalog error model.

use storefront_core::{CategoryId, DomainError};
use storefront_storage::StoreError;

/// Errors surfaced by catalog operations.
///
/// Store failures are split by direction so callers can keep a stale list on
/// a failed read and report a failed write differently.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Form input was rejected; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The filter named a category the registry does not know.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// The addressed product or category does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading from the remote store failed.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(#[source] StoreError),

    /// Writing to the remote store failed.
    #[error("remote write failed: {0}")]
    RemoteWrite(#[source] StoreError),

    /// Reading or writing local persisted state failed.
    #[error("local storage failed: {0}")]
    LocalStorage(#[source] StoreError),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Map a remote write failure, keeping "missing record" distinct.
    pub(crate) fn remote_write(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => Self::NotFound(format!("{collection}/{id}")),
            other => Self::RemoteWrite(other),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.user_message().to_string())
    }
}
