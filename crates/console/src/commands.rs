//! Console command handlers: what the product, stock and dashboard views call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use shopdesk_catalog::query::{self, CatalogSummary};
use shopdesk_catalog::{CatalogEntry, CatalogFilter, DraftForm, RESTOCK_QUANTITY};
use shopdesk_core::EntryId;

use crate::config::ConsoleConfig;
use crate::notify::Notification;
use crate::remote::{CatalogService, HttpCatalogService};
use crate::scope::{ViewHandle, ViewScope};
use crate::store::{CatalogStore, MSG_ADD_FAILED, MSG_UPDATE_FAILED, StoreError};

pub const MSG_RESTOCK_PLACED: &str = "Restock order placed";

/// Application state shared by every view of one console session.
#[derive(Clone)]
pub struct ConsoleState {
    pub config: Arc<ConsoleConfig>,
    pub store: CatalogStore,
    shell: Arc<ViewScope>,
    initialized: Arc<AtomicBool>,
}

impl ConsoleState {
    /// Build the state against the configured HTTP catalog service.
    ///
    /// Nothing is fetched until [`ConsoleState::initialize`].
    pub fn new(config: ConsoleConfig) -> anyhow::Result<Self> {
        let service = match config.request_timeout {
            Some(timeout) => HttpCatalogService::with_timeout(config.api_url.clone(), timeout)
                .context("failed to build HTTP client for the catalog service")?,
            None => HttpCatalogService::new(config.api_url.clone()),
        };
        tracing::info!(api_url = %service.api_url(), update_mode = ?config.update_mode, "console configured");
        Ok(Self::with_service(config, Arc::new(service)))
    }

    pub fn with_service(config: ConsoleConfig, service: Arc<dyn CatalogService>) -> Self {
        let store = CatalogStore::new(service, config.update_mode);
        let shell = Arc::new(store.open_view());
        Self {
            config: Arc::new(config),
            store,
            shell,
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// [`ConsoleState::new`] followed by [`ConsoleState::initialize`].
    pub async fn start(config: ConsoleConfig) -> anyhow::Result<Self> {
        let state = Self::new(config)?;
        state.initialize().await;
        Ok(state)
    }

    /// Run the initial catalog load. Only the first call does anything.
    ///
    /// A failed load is not an error here: the store has already kept its
    /// last-known entries and published a notification.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.store.load(&self.shell.handle()).await {
            tracing::warn!(error = %err, "initial catalog load did not succeed");
        }
    }

    /// Handle owned by the console shell (lives until shutdown).
    pub fn shell_handle(&self) -> ViewHandle {
        self.shell.handle()
    }

    pub fn shutdown(&self) {
        self.store.dispose();
    }
}

/// Products matching the list view's search box and category selector.
pub fn list_products(store: &CatalogStore, filter: &CatalogFilter) -> Vec<CatalogEntry> {
    store.with_entries(|entries| filter.apply(entries).into_iter().cloned().collect())
}

pub fn list_categories(store: &CatalogStore) -> Vec<String> {
    store.with_entries(query::categories)
}

pub fn dashboard_summary(store: &CatalogStore) -> CatalogSummary {
    store.with_entries(CatalogSummary::from_entries)
}

/// Submit the "Add Product" dialog.
pub async fn add_product(
    store: &CatalogStore,
    handle: &ViewHandle,
    form: &DraftForm,
) -> Result<CatalogEntry, StoreError> {
    let draft = match form.parse() {
        Ok(draft) => draft,
        Err(err) => {
            store.notify(Notification::error(format!("{MSG_ADD_FAILED}: {err}")));
            return Err(err.into());
        }
    };
    store.create(handle, &draft).await
}

/// Submit the "Edit Product" dialog for `id`.
///
/// Returns `Ok(false)` if the entry is no longer in the catalog.
pub async fn edit_product(
    store: &CatalogStore,
    handle: &ViewHandle,
    id: EntryId,
    form: &DraftForm,
) -> Result<bool, StoreError> {
    let Some(current) = store.find(id) else {
        tracing::debug!(%id, "edit ignored: no such entry");
        return Ok(false);
    };

    let replacement = match form.apply_to(&current) {
        Ok(entry) => entry,
        Err(err) => {
            store.notify(Notification::error(format!("{MSG_UPDATE_FAILED}: {err}")));
            return Err(err.into());
        }
    };

    store.update(handle, id, replacement).await
}

pub async fn delete_product(
    store: &CatalogStore,
    handle: &ViewHandle,
    id: EntryId,
) -> Result<usize, StoreError> {
    store.delete(handle, id).await
}

/// Increase or decrease stock for `id`, clamping at zero.
///
/// Returns the new stock level, or `None` if `id` is not in the catalog
/// (or was removed before the change landed). One notification per
/// successful adjustment.
pub async fn adjust_stock(
    store: &CatalogStore,
    handle: &ViewHandle,
    id: EntryId,
    delta: i64,
) -> Result<Option<u32>, StoreError> {
    let Some(current) = store.find(id) else {
        tracing::debug!(%id, delta, "stock adjustment ignored: no such entry");
        return Ok(None);
    };

    let updated = current.with_stock_adjusted(delta);
    let stock = updated.stock;
    if !store.update_quietly(handle, id, updated).await? {
        tracing::debug!(%id, delta, "stock adjustment dropped: entry removed meanwhile");
        return Ok(None);
    }

    tracing::info!(%id, delta, stock, "stock adjusted");
    store.notify(Notification::success(format!(
        "Stock updated: \"{}\" is now {} in stock.",
        current.title, stock
    )));
    Ok(Some(stock))
}

/// Low-stock alert action: add a standard restock quantity.
pub async fn restock(
    store: &CatalogStore,
    handle: &ViewHandle,
    id: EntryId,
) -> Result<Option<u32>, StoreError> {
    let stock = adjust_stock(store, handle, id, RESTOCK_QUANTITY).await?;
    if stock.is_some() {
        store.notify(Notification::success(MSG_RESTOCK_PLACED));
    }
    Ok(stock)
}
