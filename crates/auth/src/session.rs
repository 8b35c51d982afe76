//! The signed-in user, held explicitly instead of re-read on every screen.

use std::sync::RwLock;

use storefront_storage::{KeyValueStore, StateKey, read_json, write_json};

use crate::error::AuthError;
use crate::user::{Session, User};

/// Session state backed by the `"currentUser"` key.
///
/// [`init`](Self::init) reads the persisted session once; afterwards the
/// in-memory copy is the source of truth and every change is written through.
#[derive(Debug)]
pub struct SessionContext<K> {
    store: K,
    current: RwLock<Option<Session>>,
}

impl<K: KeyValueStore> SessionContext<K> {
    pub async fn init(store: K) -> Result<Self, AuthError> {
        let current: Option<Session> = match read_json(&store, StateKey::CurrentUser).await {
            Ok(session) => session,
            Err(err) => {
                // An unreadable session is treated as signed out.
                tracing::warn!(error = %err, "discarding unreadable session");
                None
            }
        };
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().ok().and_then(|s| s.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.current().is_some_and(|s| s.is_admin())
    }

    /// Persist and install a session for `user`.
    pub async fn establish(&self, user: &User) -> Result<Session, AuthError> {
        let session = Session::for_user(user);
        write_json(&self.store, StateKey::CurrentUser, &session).await?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(session.clone());
        }
        Ok(session)
    }

    /// Carry the account's current role into the session of the same user.
    pub async fn sync_role(&self, user: &User) -> Result<Option<Session>, AuthError> {
        let Some(mut session) = self.current() else {
            return Ok(None);
        };
        if session.user_id != user.id || session.role == user.role {
            return Ok(Some(session));
        }

        session.role = user.role;
        write_json(&self.store, StateKey::CurrentUser, &session).await?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(session.clone());
        }
        tracing::info!(user_id = %session.user_id, role = ?session.role, "session role updated");
        Ok(Some(session))
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(StateKey::CurrentUser).await?;
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        tracing::info!("signed out");
        Ok(())
    }
}
