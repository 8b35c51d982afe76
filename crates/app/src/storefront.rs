//! Process wiring: stores, catalog source, accounts and session.

use std::sync::Arc;

use anyhow::Context;
use storefront_auth::{AccountStore, AuthError, Session, SessionContext, SignUpForm, User};
use storefront_catalog::seed::seed_catalog;
use storefront_catalog::{
    CATEGORIES_COLLECTION, CatalogSource, Category, CategoryRegistry, LocalCatalog,
    PRODUCTS_COLLECTION, RemoteCatalog,
};
use storefront_storage::{
    DocumentStore, FirestoreConfig, FirestoreDocumentStore, InMemoryDocumentStore, KeyValueStore,
    SqliteKeyValueStore,
};

use crate::admin::AdminConsole;
use crate::browser::CatalogBrowser;
use crate::config::{CatalogBackend, StorefrontConfig};
use crate::notice::{ActionResult, Completed, Notice};

pub type SharedState = Arc<dyn KeyValueStore>;
pub type SharedDocuments = Arc<dyn DocumentStore>;

/// Everything one storefront process talks to.
pub struct Storefront {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogSource>,
    registry: Option<CategoryRegistry<SharedDocuments>>,
    accounts: AccountStore<SharedState>,
    session: SessionContext<SharedState>,
}

impl Storefront {
    /// Open the on-disk state and the configured document store.
    pub async fn open(config: StorefrontConfig) -> anyhow::Result<Self> {
        let state: SharedState = Arc::new(
            SqliteKeyValueStore::open(&config.data_path)
                .await
                .with_context(|| format!("failed to open local state at {}", config.data_path.display()))?,
        );

        let documents: SharedDocuments = match &config.firestore {
            Some(settings) => {
                let mut firestore = FirestoreConfig::new(settings.project_id.clone());
                if let Some(key) = &settings.api_key {
                    firestore = firestore.with_api_key(key.clone());
                }
                Arc::new(FirestoreDocumentStore::new(firestore))
            }
            None => {
                if config.backend == CatalogBackend::Remote {
                    tracing::warn!("STOREFRONT_FIRESTORE_PROJECT not set; remote catalog uses an in-memory store");
                }
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Ok(Self::assemble(config, state, documents).await?)
    }

    /// Wire the services over already-open stores.
    ///
    /// The document store is only used when the backend is remote.
    pub async fn assemble(
        config: StorefrontConfig,
        state: SharedState,
        documents: SharedDocuments,
    ) -> Result<Self, AuthError> {
        let catalog: Arc<dyn CatalogSource> = match config.backend {
            CatalogBackend::Local => Arc::new(LocalCatalog::new(state.clone())),
            CatalogBackend::Remote => Arc::new(RemoteCatalog::new(
                documents.clone(),
                PRODUCTS_COLLECTION,
                CATEGORIES_COLLECTION,
                seed_catalog(),
            )),
        };
        let registry = match config.backend {
            CatalogBackend::Local => None,
            CatalogBackend::Remote => Some(CategoryRegistry::new(documents, CATEGORIES_COLLECTION)),
        };

        let session = SessionContext::init(state.clone()).await?;
        tracing::info!(
            backend = catalog.kind().as_str(),
            signed_in = session.current().is_some(),
            "storefront ready"
        );

        Ok(Self {
            config,
            catalog,
            registry,
            accounts: AccountStore::new(state),
            session,
        })
    }

    /// Same as [`assemble`](Self::assemble) with a custom bcrypt cost.
    pub async fn assemble_with_cost(
        config: StorefrontConfig,
        state: SharedState,
        documents: SharedDocuments,
        cost: u32,
    ) -> Result<Self, AuthError> {
        let mut storefront = Self::assemble(config, state.clone(), documents).await?;
        storefront.accounts = AccountStore::with_cost(state, cost);
        Ok(storefront)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> Arc<dyn CatalogSource> {
        self.catalog.clone()
    }

    pub fn browser(&self) -> CatalogBrowser {
        CatalogBrowser::new(self.catalog.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.session.current()
    }

    /// The admin console, for a signed-in admin only.
    ///
    /// The role is read from the account, not the stored session, so a
    /// promotion or demotion applies to a session that is already open.
    pub async fn admin(&self) -> Result<AdminConsole, Notice> {
        let forbidden = || Notice::error(AuthError::Forbidden.user_message());
        let Some(session) = self.session.current() else {
            return Err(forbidden());
        };
        let Some(account) = self.accounts.find(&session.user_id).await.map_err(auth_notice)? else {
            tracing::warn!(user_id = %session.user_id, "session refers to an unknown account");
            return Err(forbidden());
        };

        self.session.sync_role(&account).await.map_err(auth_notice)?;
        if !account.is_admin() {
            return Err(forbidden());
        }
        Ok(AdminConsole::new(self.catalog.clone(), self.registry.clone()))
    }

    /// Create the default categories that are missing from the registry.
    pub async fn bootstrap_categories(&self) -> Result<Vec<Category>, Notice> {
        let Some(registry) = &self.registry else {
            return Err(Notice::error("Categories can only be managed with the remote catalog"));
        };
        registry
            .bootstrap(&self.config.default_categories)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "category bootstrap failed");
                Notice::error("Failed to load categories")
            })
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> ActionResult<User> {
        self.accounts
            .sign_up(form)
            .await
            .map(|user| Completed::with_success(user, "Account created successfully!"))
            .map_err(auth_notice)
    }

    /// Check credentials and install the session.
    pub async fn sign_in(&self, email: &str, password: &str) -> ActionResult<Session> {
        let user = self.accounts.sign_in(email, password).await.map_err(auth_notice)?;
        self.establish(&user).await
    }

    /// Admin sign-in: the account must hold the admin role.
    pub async fn sign_in_admin(&self, email: &str, password: &str) -> ActionResult<Session> {
        let user = self
            .accounts
            .sign_in_admin(email, password)
            .await
            .map_err(auth_notice)?;
        self.establish(&user).await
    }

    pub async fn provision_admin(&self, email: &str, password: &str) -> ActionResult<User> {
        self.accounts
            .provision_admin(email, password)
            .await
            .map(|user| Completed::with_success(user, "Admin account ready"))
            .map_err(auth_notice)
    }

    pub async fn logout(&self) -> ActionResult<()> {
        self.session
            .logout()
            .await
            .map(|()| Completed::with_success((), "Signed out"))
            .map_err(auth_notice)
    }

    async fn establish(&self, user: &User) -> ActionResult<Session> {
        self.session
            .establish(user)
            .await
            .map(|session| Completed::with_success(session, "Signed in successfully!"))
            .map_err(auth_notice)
    }
}

fn auth_notice(err: AuthError) -> Notice {
    if matches!(err, AuthError::Hashing(_) | AuthError::LocalStorage(_)) {
        tracing::error!(error = %err, "account operation failed");
    }
    Notice::error(err.user_message())
}
