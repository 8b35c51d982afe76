//! Account registration and credential checks.
//!
//! All accounts are one JSON array under `"users"`. Every write reads the
//! array, changes it and writes it back whole.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_core::UserId;
use storefront_storage::{KeyValueStore, StateKey, read_json, write_json};

use crate::error::AuthError;
use crate::user::{Role, User};

/// Sign-up form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(AuthError::validation("Please fill in all fields"));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AccountStore<K> {
    store: K,
    cost: u32,
}

impl<K: KeyValueStore> AccountStore<K> {
    pub fn new(store: K) -> Self {
        Self::with_cost(store, bcrypt::DEFAULT_COST)
    }

    /// Use a specific bcrypt work factor (4..=31).
    pub fn with_cost(store: K, cost: u32) -> Self {
        Self { store, cost }
    }

    pub async fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(read_json(&self.store, StateKey::Users).await?.unwrap_or_default())
    }

    pub async fn find(&self, id: &UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users().await?.into_iter().find(|u| &u.id == id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users().await?.into_iter().find(|u| u.has_email(email)))
    }

    /// Register a customer account.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthError> {
        form.validate()?;
        self.create(form.email.trim(), &form.password, Role::Customer).await
    }

    /// Create an admin account, or promote an existing one after checking its password.
    pub async fn provision_admin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::validation("Please fill in all fields"));
        }

        let mut users = self.users().await?;
        if let Some(existing) = users.iter_mut().find(|u| u.has_email(email)) {
            if !bcrypt::verify(password, &existing.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            existing.role = Role::Admin;
            let promoted = existing.clone();
            write_json(&self.store, StateKey::Users, &users).await?;
            tracing::info!(user_id = %promoted.id, "account promoted to admin");
            return Ok(promoted);
        }

        self.create(email.trim(), password, Role::Admin).await
    }

    /// Check credentials. Unknown email and wrong password are the same error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::validation("Please fill in all fields"));
        }

        let Some(user) = self.find_by_email(email).await? else {
            tracing::warn!("sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !bcrypt::verify(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, role = %user.role, "signed in");
        Ok(user)
    }

    /// Like [`sign_in`](Self::sign_in), but only admin accounts pass.
    pub async fn sign_in_admin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.sign_in(email, password).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "non-admin attempted admin sign-in");
            return Err(AuthError::Forbidden);
        }
        Ok(user)
    }

    async fn create(&self, email: &str, password: &str, role: Role) -> Result<User, AuthError> {
        let mut users = self.users().await?;
        if users.iter().any(|u| u.has_email(email)) {
            return Err(AuthError::Conflict);
        }

        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash: bcrypt::hash(password, self.cost)?,
            role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        write_json(&self.store, StateKey::Users, &users).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "account created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_storage::InMemoryKeyValueStore;

    fn accounts() -> AccountStore<InMemoryKeyValueStore> {
        AccountStore::with_cost(InMemoryKeyValueStore::new(), 4)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let accounts = accounts();
        let user = accounts
            .sign_up(&SignUpForm::new("jane@example.com", "secret", "secret"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.display_name, "jane");
        assert_ne!(user.password_hash, "secret");

        let signed_in = accounts.sign_in("JANE@example.com", "secret").await.unwrap();
        assert_eq!(signed_in.id, user.id);
    }

    #[tokio::test]
    async fn sign_up_validates_input() {
        let accounts = accounts();
        let err = accounts.sign_up(&SignUpForm::new("", "a", "a")).await.unwrap_err();
        assert_eq!(err.user_message(), "Please fill in all fields");

        let err = accounts.sign_up(&SignUpForm::new("a@b.c", "a", "b")).await.unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
        assert!(accounts.users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let accounts = accounts();
        accounts.sign_up(&SignUpForm::new("a@b.c", "pw", "pw")).await.unwrap();
        let err = accounts.sign_up(&SignUpForm::new("A@B.C", "pw", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let accounts = accounts();
        accounts.sign_up(&SignUpForm::new("a@b.c", "pw", "pw")).await.unwrap();

        assert!(matches!(
            accounts.sign_in("a@b.c", "nope").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            accounts.sign_in("x@b.c", "pw").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn admin_sign_in_requires_the_admin_role() {
        let accounts = accounts();
        accounts.sign_up(&SignUpForm::new("shopper@b.c", "pw", "pw")).await.unwrap();
        assert!(matches!(
            accounts.sign_in_admin("shopper@b.c", "pw").await.unwrap_err(),
            AuthError::Forbidden
        ));

        accounts.provision_admin("admin@b.c", "root").await.unwrap();
        assert!(accounts.sign_in_admin("admin@b.c", "root").await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn provisioning_an_existing_account_promotes_it() {
        let accounts = accounts();
        let user = accounts.sign_up(&SignUpForm::new("a@b.c", "pw", "pw")).await.unwrap();

        assert!(matches!(
            accounts.provision_admin("a@b.c", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
        let promoted = accounts.provision_admin("a@b.c", "pw").await.unwrap();
        assert_eq!(promoted.id, user.id);
        assert_eq!(accounts.users().await.unwrap().len(), 1);
        assert!(accounts.sign_in_admin("a@b.c", "pw").await.is_ok());
    }
}
