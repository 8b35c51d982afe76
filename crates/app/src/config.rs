//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;

use storefront_catalog::seed::DEFAULT_CATEGORIES;
use storefront_observability::LogFormat;

pub const ENV_BACKEND: &str = "STOREFRONT_BACKEND";
pub const ENV_DATA_PATH: &str = "STOREFRONT_DATA_PATH";
pub const ENV_FIRESTORE_PROJECT: &str = "STOREFRONT_FIRESTORE_PROJECT";
pub const ENV_FIRESTORE_API_KEY: &str = "STOREFRONT_FIRESTORE_API_KEY";
pub const ENV_DEFAULT_CATEGORIES: &str = "STOREFRONT_DEFAULT_CATEGORIES";
pub const ENV_LOG_FORMAT: &str = "STOREFRONT_LOG_FORMAT";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown catalog backend '{0}' (expected 'local' or 'remote')")]
    InvalidBackend(String),

    #[error("unknown log format '{0}' (expected 'json' or 'compact')")]
    InvalidLogFormat(String),

    #[error("could not resolve a data directory; set {ENV_DATA_PATH}")]
    NoDataDir,
}

/// Where the product catalog lives. Chosen once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogBackend {
    /// Products in local persisted state.
    #[default]
    Local,
    /// Seed catalog merged with the remote document store.
    Remote,
}

impl FromStr for CatalogBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub backend: CatalogBackend,
    /// SQLite file holding local state.
    pub data_path: PathBuf,
    /// `None` means the remote catalog runs against an in-process store.
    pub firestore: Option<FirestoreSettings>,
    pub default_categories: Vec<String>,
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing or blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get(ENV_BACKEND) {
            Some(raw) => raw.parse()?,
            None => CatalogBackend::default(),
        };

        let data_path = match get(ENV_DATA_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_data_path()?,
        };

        let firestore = get(ENV_FIRESTORE_PROJECT).map(|project_id| FirestoreSettings {
            project_id,
            api_key: get(ENV_FIRESTORE_API_KEY),
        });

        let default_categories = match get(ENV_DEFAULT_CATEGORIES) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        };

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::Json,
        };

        Ok(Self {
            backend,
            data_path,
            firestore,
            default_categories,
            log_format,
        })
    }

    pub fn with_backend(mut self, backend: CatalogBackend) -> Self {
        self.backend = backend;
        self
    }
}

/// `{data dir}/storefront/state.db`.
fn default_data_path() -> Result<PathBuf, ConfigError> {
    let mut path = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;
    path.push("storefront");
    path.push("state.db");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = StorefrontConfig::from_lookup(lookup(&[(ENV_DATA_PATH, "/tmp/s.db")])).unwrap();
        assert_eq!(config.backend, CatalogBackend::Local);
        assert_eq!(config.data_path, PathBuf::from("/tmp/s.db"));
        assert!(config.firestore.is_none());
        assert_eq!(config.default_categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn remote_backend_with_firestore_settings() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            (ENV_BACKEND, " Remote "),
            (ENV_DATA_PATH, "/tmp/s.db"),
            (ENV_FIRESTORE_PROJECT, "shop-1"),
            (ENV_FIRESTORE_API_KEY, "k"),
            (ENV_DEFAULT_CATEGORIES, "Books, ,Games"),
        ]))
        .unwrap();

        assert_eq!(config.backend, CatalogBackend::Remote);
        let firestore = config.firestore.unwrap();
        assert_eq!(firestore.project_id, "shop-1");
        assert_eq!(firestore.api_key.as_deref(), Some("k"));
        assert_eq!(config.default_categories, vec!["Books", "Games"]);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StorefrontConfig::from_lookup(lookup(&[(ENV_BACKEND, "cloud")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBackend("cloud".into()));

        let err = StorefrontConfig::from_lookup(lookup(&[
            (ENV_DATA_PATH, "/tmp/s.db"),
            (ENV_LOG_FORMAT, "xml"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogFormat("xml".into()));
    }
}
