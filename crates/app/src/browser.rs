//! The product list view: refresh with fallback, search, request ordering.
//!
//! Every refresh takes a ticket from a monotonically increasing counter.
//! A response is applied only if its ticket is newer than the last applied
//! one, so a slow response for an old filter never replaces a newer list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use storefront_catalog::{CatalogError, CatalogSnapshot, CatalogSource, CategoryIndex, Product, search};
use storefront_core::CategoryId;

use crate::notice::Notice;

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseOutcome {
    /// The list to show, with at most one notice about how it was obtained.
    Applied {
        snapshot: CatalogSnapshot,
        notice: Option<Notice>,
    },
    /// A newer refresh was applied first; this response was dropped.
    Superseded { ticket: u64 },
}

impl BrowseOutcome {
    pub fn snapshot(&self) -> Option<&CatalogSnapshot> {
        match self {
            Self::Applied { snapshot, .. } => Some(snapshot),
            Self::Superseded { .. } => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Applied { notice, .. } => notice.as_ref(),
            Self::Superseded { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct ViewState {
    applied: u64,
    snapshot: Option<CatalogSnapshot>,
}

pub struct CatalogBrowser {
    source: Arc<dyn CatalogSource>,
    issued: AtomicU64,
    state: RwLock<ViewState>,
}

impl CatalogBrowser {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            issued: AtomicU64::new(0),
            state: RwLock::new(ViewState::default()),
        }
    }

    /// Reserve the next request ticket.
    pub fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Load the list for `filter` and apply it unless a newer one won.
    pub async fn refresh(&self, filter: Option<&CategoryId>) -> BrowseOutcome {
        let ticket = self.ticket();
        let result = self.source.list(filter).await;
        self.complete(ticket, filter, result)
    }

    /// Apply the result of the request holding `ticket`.
    ///
    /// On failure the list falls back to the source's offline view (the seed
    /// catalog for the remote source), or to the last list shown for the same
    /// filter when the source has none. Exactly one error notice is produced.
    pub fn complete(
        &self,
        ticket: u64,
        filter: Option<&CategoryId>,
        result: Result<CatalogSnapshot, CatalogError>,
    ) -> BrowseOutcome {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if ticket <= state.applied {
            tracing::debug!(ticket, applied = state.applied, ok = result.is_ok(), "dropping superseded catalog response");
            return BrowseOutcome::Superseded { ticket };
        }

        let (snapshot, notice) = match result {
            Ok(snapshot) => (snapshot, None),
            Err(err) => {
                tracing::warn!(ticket, error = %err, "catalog refresh failed; showing fallback list");
                let fallback = self.source.fallback(filter);
                let snapshot = if fallback.is_empty() {
                    state
                        .snapshot
                        .clone()
                        .filter(|s| s.filter.as_ref() == filter)
                        .unwrap_or(fallback)
                } else {
                    fallback
                };
                (snapshot, Some(Notice::error(refresh_failure_message(&err))))
            }
        };

        state.applied = ticket;
        state.snapshot = Some(snapshot.clone());
        BrowseOutcome::Applied { snapshot, notice }
    }

    /// The list currently shown, if any refresh has been applied.
    pub fn current(&self) -> Option<CatalogSnapshot> {
        self.state.read().ok().and_then(|s| s.snapshot.clone())
    }

    /// Search the current list by product name or category name.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        let Some(snapshot) = self.current() else {
            return Vec::new();
        };
        let index = match self.source.categories().await {
            Ok(categories) => CategoryIndex::new(&categories),
            Err(err) => {
                tracing::warn!(error = %err, "searching without category names");
                CategoryIndex::default()
            }
        };
        search(&snapshot.products, query, &index)
    }
}

fn refresh_failure_message(err: &CatalogError) -> &'static str {
    match err {
        CatalogError::UnknownCategory(_) => "This category no longer exists",
        _ => "Failed to load products",
    }
}
