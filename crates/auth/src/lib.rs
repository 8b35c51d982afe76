//! `storefront-auth`: customer and admin accounts plus the signed-in session.
//!
//! Accounts and the session live in local persisted state (`"users"` and
//! `"currentUser"`). Nothing here knows about the catalog.

pub mod accounts;
pub mod error;
pub mod session;
pub mod user;

pub use accounts::{AccountStore, SignUpForm};
pub use error::AuthError;
pub use session::SessionContext;
pub use user::{Role, Session, User};
