//! `storefront-core`: domain building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no network).

pub mod collation;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use collation::locale_cmp;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, UserId};
pub use value_object::{Price, ValueObject};
