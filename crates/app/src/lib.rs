//! `storefront-app`: configuration, the list and admin views, and process wiring.
//!
//! The `storefront` binary in `main.rs` is a thin command-line shell over
//! [`Storefront`].

pub mod admin;
pub mod browser;
pub mod config;
pub mod notice;
pub mod storefront;

pub use admin::AdminConsole;
pub use browser::{BrowseOutcome, CatalogBrowser};
pub use config::{CatalogBackend, ConfigError, StorefrontConfig};
pub use notice::{ActionResult, Completed, Notice, NoticeLevel};
pub use storefront::{SharedDocuments, SharedState, Storefront};
