//! Error types for storage operations.

/// Errors that can occur while talking to either store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record addressed by id does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Requested document id.
        id: String,
    },

    /// The local SQLite database failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// A stored value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote store could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The remote store answered with a non-success status.
    #[error("remote store error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// A remote response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// Any other backend failure (lock poisoning, setup).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
