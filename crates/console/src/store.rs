//! The catalog store: single source of truth for the entries the console shows.
//!
//! All remote interaction goes through here. Completions are applied under a
//! short write lock (never held across an `.await`), so each one is atomic with
//! respect to the others and the last applied completion wins. Nothing is
//! versioned and nothing is retried.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;

use shopdesk_catalog::{CatalogEntry, ProductDraft};
use shopdesk_core::{DomainError, EntryId};

use crate::config::UpdateMode;
use crate::notify::{Notification, NotificationCenter, NotificationStream};
use crate::remote::{CatalogService, RemoteError};
use crate::scope::{ViewHandle, ViewScope};

pub const MSG_FETCH_FAILED: &str = "Failed to fetch products";
pub const MSG_ADDED: &str = "Product added successfully";
pub const MSG_ADD_FAILED: &str = "Failed to add product";
pub const MSG_UPDATED: &str = "Product updated successfully";
pub const MSG_UPDATE_FAILED: &str = "Failed to update product";
pub const MSG_DELETED: &str = "Product deleted successfully";
pub const MSG_DELETE_FAILED: &str = "Failed to delete product";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("operation abandoned: the originating view is gone")]
    Cancelled,
}

/// Entries plus the initial-load flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    entries: Vec<CatalogEntry>,
    is_loading: bool,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            is_loading: true,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replace every entry keyed by `id`. Returns whether any matched.
    fn replace(&mut self, id: EntryId, replacement: &CatalogEntry) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.has_id(id)) {
            *entry = replacement.clone();
            found = true;
        }
        found
    }

    /// Remove every entry keyed by `id`. Returns how many were removed.
    fn remove(&mut self, id: EntryId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.has_id(id));
        before - self.entries.len()
    }
}

struct StoreInner {
    service: Arc<dyn CatalogService>,
    update_mode: UpdateMode,
    state: RwLock<CatalogState>,
    notifications: NotificationCenter,
    root: CancellationToken,
}

/// Cheap-to-clone handle on one store instance.
///
/// Constructed explicitly and passed to whatever needs it; there is no
/// process-global store. [`CatalogStore::dispose`] ends its lifetime.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

impl core::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read();
        f.debug_struct("CatalogStore")
            .field("entries", &state.entries.len())
            .field("is_loading", &state.is_loading)
            .field("update_mode", &self.inner.update_mode)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl CatalogStore {
    pub fn new(service: Arc<dyn CatalogService>, update_mode: UpdateMode) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                service,
                update_mode,
                state: RwLock::new(CatalogState::new()),
                notifications: NotificationCenter::new(),
                root: CancellationToken::new(),
            }),
        }
    }

    // ---- lifetime ----------------------------------------------------------

    /// Scope for one view; closed automatically when the store is disposed.
    pub fn open_view(&self) -> ViewScope {
        ViewScope::child_of(&self.inner.root)
    }

    /// Abandon every outstanding operation and refuse new ones.
    pub fn dispose(&self) {
        tracing::info!("disposing catalog store");
        self.inner.root.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.root.is_cancelled()
    }

    // ---- reads -------------------------------------------------------------

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.read().entries.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    pub fn find(&self, id: EntryId) -> Option<CatalogEntry> {
        self.read().entries.iter().find(|e| e.has_id(id)).cloned()
    }

    /// Borrow the entries without cloning them.
    pub fn with_entries<R>(&self, f: impl FnOnce(&[CatalogEntry]) -> R) -> R {
        f(&self.read().entries)
    }

    pub fn snapshot(&self) -> CatalogState {
        self.read().clone()
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.inner.update_mode
    }

    // ---- notifications -----------------------------------------------------

    pub fn subscribe(&self) -> NotificationStream {
        self.inner.notifications.subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        self.inner.notifications.publish(notification);
    }

    // ---- operations --------------------------------------------------------

    /// Fetch the whole catalog and replace the local entries with it.
    ///
    /// On failure the last-known entries stay in place. Either way the
    /// loading flag is cleared and never set again.
    pub async fn load(&self, handle: &ViewHandle) -> Result<usize, StoreError> {
        let result = self.call(handle, self.inner.service.fetch_all()).await?;

        match result {
            Ok(entries) => {
                let count = self.apply(handle, move |state| {
                    state.entries = entries;
                    state.is_loading = false;
                    state.entries.len()
                })?;
                tracing::info!(entries = count, "catalog loaded");
                Ok(count)
            }
            Err(err) => {
                self.apply(handle, |state| state.is_loading = false)?;
                tracing::warn!(error = %err, "catalog load failed");
                self.notify(Notification::error(MSG_FETCH_FAILED));
                Err(err.into())
            }
        }
    }

    /// Validate `draft`, send it to the remote create endpoint and append the
    /// server's echo to the local entries.
    pub async fn create(
        &self,
        handle: &ViewHandle,
        draft: &ProductDraft,
    ) -> Result<CatalogEntry, StoreError> {
        if let Err(err) = draft.validate() {
            tracing::debug!(error = %err, "rejected invalid draft");
            self.notify(Notification::error(format!("{MSG_ADD_FAILED}: {err}")));
            return Err(err.into());
        }

        let result = self.call(handle, self.inner.service.create(draft)).await?;

        match result {
            Ok(created) => {
                let appended = created.clone();
                self.apply(handle, move |state| state.entries.push(appended))?;
                tracing::info!(id = ?created.id, title = %created.title, "product created");
                self.notify(Notification::success(MSG_ADDED));
                Ok(created)
            }
            Err(err) => {
                self.ensure_live(handle)?;
                tracing::warn!(error = %err, "product create failed");
                self.notify(Notification::error(MSG_ADD_FAILED));
                Err(err.into())
            }
        }
    }

    /// Replace the entry keyed by `id` with `entry` (full record).
    ///
    /// The lookup uses `id`, never `entry.id`. Returns `Ok(false)` when no
    /// entry matched, including one removed while the remote call was in
    /// flight. Whether the remote catalog is told depends on the store's
    /// [`UpdateMode`].
    pub async fn update(
        &self,
        handle: &ViewHandle,
        id: EntryId,
        entry: CatalogEntry,
    ) -> Result<bool, StoreError> {
        self.update_entry(handle, id, entry, true).await
    }

    /// [`CatalogStore::update`] for callers that announce success themselves.
    /// Failures are still notified.
    pub async fn update_quietly(
        &self,
        handle: &ViewHandle,
        id: EntryId,
        entry: CatalogEntry,
    ) -> Result<bool, StoreError> {
        self.update_entry(handle, id, entry, false).await
    }

    async fn update_entry(
        &self,
        handle: &ViewHandle,
        id: EntryId,
        entry: CatalogEntry,
        announce: bool,
    ) -> Result<bool, StoreError> {
        match self.inner.update_mode {
            UpdateMode::LocalOnly => {
                let found = self.apply(handle, |state| state.replace(id, &entry))?;
                if !found {
                    tracing::debug!(%id, "update ignored: no such entry");
                }
                Ok(found)
            }
            UpdateMode::Remote => {
                if self.find(id).is_none() {
                    self.ensure_live(handle)?;
                    tracing::debug!(%id, "update ignored: no such entry");
                    return Ok(false);
                }

                let result = self
                    .call(handle, self.inner.service.replace(id, &entry))
                    .await?;

                match result {
                    Ok(()) => {
                        let found = self.apply(handle, |state| state.replace(id, &entry))?;
                        if !found {
                            tracing::debug!(%id, "remote update landed after the entry was removed");
                            return Ok(false);
                        }
                        tracing::info!(%id, "product updated remotely");
                        if announce {
                            self.notify(Notification::success(MSG_UPDATED));
                        }
                        Ok(true)
                    }
                    Err(err) => {
                        self.ensure_live(handle)?;
                        tracing::warn!(%id, error = %err, "product update failed");
                        self.notify(Notification::error(MSG_UPDATE_FAILED));
                        Err(err.into())
                    }
                }
            }
        }
    }

    /// Delete `id` remotely, then drop every local entry keyed by it.
    ///
    /// Returns the number of local entries removed.
    pub async fn delete(&self, handle: &ViewHandle, id: EntryId) -> Result<usize, StoreError> {
        let result = self.call(handle, self.inner.service.delete(id)).await?;

        match result {
            Ok(()) => {
                let removed = self.apply(handle, |state| state.remove(id))?;
                tracing::info!(%id, removed, "product deleted");
                self.notify(Notification::success(MSG_DELETED));
                Ok(removed)
            }
            Err(err) => {
                self.ensure_live(handle)?;
                tracing::warn!(%id, error = %err, "product delete failed");
                self.notify(Notification::error(MSG_DELETE_FAILED));
                Err(err.into())
            }
        }
    }

    // ---- internals ---------------------------------------------------------

    fn is_live(&self, handle: &ViewHandle) -> bool {
        handle.is_live() && !self.inner.root.is_cancelled()
    }

    fn ensure_live(&self, handle: &ViewHandle) -> Result<(), StoreError> {
        if self.is_live(handle) {
            Ok(())
        } else {
            tracing::debug!("discarding completion for a released view");
            Err(StoreError::Cancelled)
        }
    }

    /// Run a remote call unless the view (or the store) goes away first.
    async fn call<T, F>(&self, handle: &ViewHandle, request: F) -> Result<Result<T, RemoteError>, StoreError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        self.ensure_live(handle)?;

        tokio::select! {
            biased;
            _ = handle.released() => {
                tracing::debug!("request abandoned: view released");
                Err(StoreError::Cancelled)
            }
            _ = self.inner.root.cancelled() => {
                tracing::debug!("request abandoned: store disposed");
                Err(StoreError::Cancelled)
            }
            result = request => Ok(result),
        }
    }

    /// Apply a mutation atomically, provided the originating view is still live.
    fn apply<R>(&self, handle: &ViewHandle, mutate: impl FnOnce(&mut CatalogState) -> R) -> Result<R, StoreError> {
        let mut state = self.write();
        self.ensure_live(handle)?;
        Ok(mutate(&mut state))
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::notify::NotificationLevel;

    /// In-process catalog service with switchable failures and gates that
    /// hold a call open until the test releases them.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub(crate) remote: Mutex<Vec<CatalogEntry>>,
        pub(crate) next_id: AtomicUsize,
        pub(crate) fail_fetch: AtomicBool,
        pub(crate) fail_create: AtomicBool,
        pub(crate) fail_replace: AtomicBool,
        pub(crate) fail_delete: AtomicBool,
        pub(crate) fetch_calls: AtomicUsize,
        pub(crate) create_calls: AtomicUsize,
        pub(crate) replace_calls: AtomicUsize,
        pub(crate) delete_calls: AtomicUsize,
        pub(crate) fetch_gate: Arc<tokio::sync::Mutex<()>>,
        pub(crate) replace_gate: Arc<tokio::sync::Mutex<()>>,
        pub(crate) delete_gate: Arc<tokio::sync::Mutex<()>>,
    }

    impl FakeCatalog {
        pub(crate) fn with_entries(entries: Vec<CatalogEntry>) -> Arc<Self> {
            let fake = Self::default();
            fake.next_id.store(100, Ordering::SeqCst);
            *fake.remote.lock().unwrap() = entries;
            Arc::new(fake)
        }

        fn api_error() -> RemoteError {
            RemoteError::Api(500, "boom".to_string())
        }
    }

    #[async_trait]
    impl CatalogService for FakeCatalog {
        async fn fetch_all(&self) -> Result<Vec<CatalogEntry>, RemoteError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            // The response is computed before the gate, like a slow network.
            let snapshot = self.remote.lock().unwrap().clone();
            let _gate = self.fetch_gate.lock().await;
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(RemoteError::Network("unreachable".to_string()));
            }
            Ok(snapshot)
        }

        async fn create(&self, draft: &ProductDraft) -> Result<CatalogEntry, RemoteError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(Self::api_error());
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
            let entry = CatalogEntry::new(EntryId::new(id), draft.title.clone(), draft.price, draft.stock)
                .with_description(draft.description.clone())
                .with_category(draft.category.clone());
            self.remote.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        async fn replace(&self, _id: EntryId, _entry: &CatalogEntry) -> Result<(), RemoteError> {
            self.replace_calls.fetch_add(1, Ordering::SeqCst);
            let _gate = self.replace_gate.lock().await;
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(Self::api_error());
            }
            Ok(())
        }

        async fn delete(&self, id: EntryId) -> Result<(), RemoteError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            let _gate = self.delete_gate.lock().await;
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(RemoteError::Api(404, "not found".to_string()));
            }
            let mut remote = self.remote.lock().unwrap();
            let before = remote.len();
            remote.retain(|e| !e.has_id(id));
            if remote.len() == before {
                return Err(RemoteError::Api(404, "not found".to_string()));
            }
            Ok(())
        }
    }

    pub(crate) fn entry(id: u64, title: &str, stock: u32) -> CatalogEntry {
        CatalogEntry::new(EntryId::new(id), title, 10.0, stock).with_category("misc")
    }

    fn store_with(fake: &Arc<FakeCatalog>, mode: UpdateMode) -> CatalogStore {
        CatalogStore::new(fake.clone(), mode)
    }

    async fn loaded(entries: Vec<CatalogEntry>) -> (Arc<FakeCatalog>, CatalogStore, ViewScope) {
        let fake = FakeCatalog::with_entries(entries);
        let store = store_with(&fake, UpdateMode::LocalOnly);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();
        (fake, store, view)
    }

    fn ids(store: &CatalogStore) -> Vec<u64> {
        store.entries().iter().filter_map(|e| e.id).map(|id| id.get()).collect()
    }

    pub(crate) async fn wait_for(counter: &AtomicUsize, at_least: usize) {
        while counter.load(Ordering::SeqCst) < at_least {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn store_starts_loading_and_empty() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        let store = store_with(&fake, UpdateMode::LocalOnly);
        assert!(store.is_loading());
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn load_replaces_entries_and_clears_loading() {
        let (_fake, store, _view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;
        assert_eq!(ids(&store), vec![1, 2]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn repeated_load_with_unchanged_remote_is_idempotent() {
        let (_fake, store, view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;
        let first = store.entries();
        store.load(&view.handle()).await.unwrap();
        store.load(&view.handle()).await.unwrap();
        assert_eq!(store.entries(), first);
    }

    #[tokio::test]
    async fn first_load_failure_leaves_empty_and_notifies() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        fake.fail_fetch.store(true, Ordering::SeqCst);
        let store = store_with(&fake, UpdateMode::LocalOnly);
        let toasts = store.subscribe();
        let view = store.open_view();

        let err = store.load(&view.handle()).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(RemoteError::Network(_))));
        assert!(store.entries().is_empty());
        assert!(!store.is_loading());

        let got = toasts.drain();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].level, NotificationLevel::Error);
        assert_eq!(got[0].message, MSG_FETCH_FAILED);
    }

    #[tokio::test]
    async fn later_load_failure_keeps_last_known_entries() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        fake.fail_fetch.store(true, Ordering::SeqCst);

        assert!(store.load(&view.handle()).await.is_err());
        assert_eq!(ids(&store), vec![1]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn create_appends_in_call_order() {
        let (_fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        let toasts = store.subscribe();
        let handle = view.handle();

        let first = store
            .create(&handle, &ProductDraft::new("Lamp", "", 5.0, 1, "lighting"))
            .await
            .unwrap();
        let second = store
            .create(&handle, &ProductDraft::new("Desk", "", 50.0, 2, "furniture"))
            .await
            .unwrap();

        assert_eq!(ids(&store), vec![1, first.id.unwrap().get(), second.id.unwrap().get()]);
        assert_eq!(store.entries()[1], first);
        assert_eq!(store.entries()[2], second);
        assert!(toasts.drain().iter().all(|n| n.message == MSG_ADDED));
    }

    #[tokio::test]
    async fn create_failure_leaves_entries_and_notifies() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        fake.fail_create.store(true, Ordering::SeqCst);
        let toasts = store.subscribe();

        let err = store
            .create(&view.handle(), &ProductDraft::new("Lamp", "", 5.0, 1, "lighting"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Remote(RemoteError::Api(500, _))));
        assert_eq!(ids(&store), vec![1]);
        let got = toasts.drain();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].message, MSG_ADD_FAILED);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_remote() {
        let (fake, store, view) = loaded(vec![]).await;
        let toasts = store.subscribe();

        let err = store
            .create(&view.handle(), &ProductDraft::new("  ", "", 5.0, 1, "lighting"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(DomainError::Validation(_))));
        assert_eq!(fake.create_calls.load(Ordering::SeqCst), 0);
        assert!(store.entries().is_empty());
        assert!(toasts.try_recv().unwrap().is_error());
    }

    #[tokio::test]
    async fn update_is_keyed_on_the_id_parameter() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;

        // Payload claims id 99, but the lookup key is 1.
        let replacement = entry(99, "Replaced", 7);
        let found = store.update(&view.handle(), EntryId::new(1), replacement.clone()).await.unwrap();

        assert!(found);
        assert_eq!(store.entries(), vec![replacement, entry(2, "B", 2)]);
        assert_eq!(fake.replace_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_a_silent_no_op() {
        let (_fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        let toasts = store.subscribe();
        let before = store.entries();

        let found = store.update(&view.handle(), EntryId::new(42), entry(42, "X", 1)).await.unwrap();

        assert!(!found);
        assert_eq!(store.entries(), before);
        assert!(toasts.try_recv().is_none());
    }

    #[tokio::test]
    async fn remote_update_success_replaces_and_notifies() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        let store = store_with(&fake, UpdateMode::Remote);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();
        let toasts = store.subscribe();

        let found = store.update(&view.handle(), EntryId::new(1), entry(1, "A2", 3)).await.unwrap();

        assert!(found);
        assert_eq!(store.entries()[0].title, "A2");
        assert_eq!(fake.replace_calls.load(Ordering::SeqCst), 1);
        assert_eq!(toasts.try_recv().unwrap().message, MSG_UPDATED);
    }

    #[tokio::test]
    async fn remote_update_failure_leaves_entry_untouched() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        fake.fail_replace.store(true, Ordering::SeqCst);
        let store = store_with(&fake, UpdateMode::Remote);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();
        let toasts = store.subscribe();

        let err = store.update(&view.handle(), EntryId::new(1), entry(1, "A2", 3)).await.unwrap_err();

        assert!(matches!(err, StoreError::Remote(_)));
        assert_eq!(store.entries(), vec![entry(1, "A", 1)]);
        assert_eq!(toasts.try_recv().unwrap().message, MSG_UPDATE_FAILED);
    }

    #[tokio::test]
    async fn remote_update_of_unknown_id_sends_nothing() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        let store = store_with(&fake, UpdateMode::Remote);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();

        let found = store.update(&view.handle(), EntryId::new(5), entry(5, "X", 1)).await.unwrap();

        assert!(!found);
        assert_eq!(fake.replace_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_update_overtaken_by_delete_is_a_silent_no_op() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        let store = store_with(&fake, UpdateMode::Remote);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();
        let toasts = store.subscribe();
        let gate = fake.replace_gate.clone().lock_owned().await;

        let edit = {
            let store = store.clone();
            let handle = view.handle();
            tokio::spawn(async move { store.update(&handle, EntryId::new(1), entry(1, "A2", 2)).await })
        };
        wait_for(&fake.replace_calls, 1).await;

        store.delete(&view.handle(), EntryId::new(1)).await.unwrap();
        drop(gate);

        assert!(!edit.await.unwrap().unwrap());
        assert!(store.entries().is_empty());
        let messages: Vec<String> = toasts.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec![MSG_DELETED.to_string()]);
    }

    #[tokio::test]
    async fn quiet_remote_update_skips_success_notice_only() {
        let fake = FakeCatalog::with_entries(vec![entry(1, "A", 1)]);
        let store = store_with(&fake, UpdateMode::Remote);
        let view = store.open_view();
        store.load(&view.handle()).await.unwrap();
        let toasts = store.subscribe();

        assert!(store.update_quietly(&view.handle(), EntryId::new(1), entry(1, "A2", 2)).await.unwrap());
        assert_eq!(store.entries()[0].title, "A2");
        assert!(toasts.try_recv().is_none());

        fake.fail_replace.store(true, Ordering::SeqCst);
        assert!(store.update_quietly(&view.handle(), EntryId::new(1), entry(1, "A3", 3)).await.is_err());
        assert_eq!(toasts.try_recv().unwrap().message, MSG_UPDATE_FAILED);
    }

    #[tokio::test]
    async fn delete_removes_exactly_the_matching_ids() {
        let (_fake, store, view) =
            loaded(vec![entry(1, "A", 1), entry(2, "B", 2), entry(3, "C", 3), entry(4, "D", 4)]).await;
        let toasts = store.subscribe();

        for id in [2, 4] {
            store.delete(&view.handle(), EntryId::new(id)).await.unwrap();
        }

        assert_eq!(store.entries(), vec![entry(1, "A", 1), entry(3, "C", 3)]);
        assert!(toasts.drain().iter().all(|n| n.message == MSG_DELETED));
    }

    #[tokio::test]
    async fn delete_removes_duplicate_local_ids() {
        let (_fake, store, view) = loaded(vec![entry(7, "A", 1), entry(8, "B", 1), entry(7, "A again", 1)]).await;

        let removed = store.delete(&view.handle(), EntryId::new(7)).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(ids(&store), vec![8]);
    }

    #[tokio::test]
    async fn failed_delete_leaves_state_untouched() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;
        fake.fail_delete.store(true, Ordering::SeqCst);
        let toasts = store.subscribe();

        let err = store.delete(&view.handle(), EntryId::new(2)).await.unwrap_err();

        assert!(matches!(err, StoreError::Remote(RemoteError::Api(404, _))));
        assert_eq!(store.entries(), vec![entry(1, "A", 1), entry(2, "B", 2)]);
        let got = toasts.drain();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].level, NotificationLevel::Error);
        assert_eq!(got[0].message, MSG_DELETE_FAILED);
    }

    #[tokio::test]
    async fn second_delete_of_same_id_is_an_ordinary_failure() {
        let (_fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        store.delete(&view.handle(), EntryId::new(1)).await.unwrap();

        let err = store.delete(&view.handle(), EntryId::new(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(RemoteError::Api(404, _))));
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn released_view_abandons_in_flight_delete() {
        let (fake, store, _view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;
        let toasts = store.subscribe();
        let gate = fake.delete_gate.clone().lock_owned().await;

        let doomed = store.open_view();
        let handle = doomed.handle();
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.delete(&handle, EntryId::new(2)).await })
        };
        wait_for(&fake.delete_calls, 1).await;

        drop(doomed);
        drop(gate);

        let result = task.await.unwrap();
        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert_eq!(ids(&store), vec![1, 2]);
        assert!(toasts.try_recv().is_none());
    }

    #[tokio::test]
    async fn released_handle_is_refused_before_any_request() {
        let (fake, store, _view) = loaded(vec![entry(1, "A", 1)]).await;
        let gone = store.open_view();
        let handle = gone.handle();
        gone.close();

        let result = store.delete(&handle, EntryId::new(1)).await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert_eq!(fake.delete_calls.load(Ordering::SeqCst), 0);

        let result = store.update(&handle, EntryId::new(1), entry(1, "X", 0)).await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert_eq!(store.entries(), vec![entry(1, "A", 1)]);
    }

    #[tokio::test]
    async fn disposed_store_refuses_all_operations() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1)]).await;
        store.dispose();

        assert!(store.is_disposed());
        assert!(!view.handle().is_live());
        assert!(matches!(store.load(&view.handle()).await, Err(StoreError::Cancelled)));

        // A handle from an unrelated scope is still refused.
        let stray = ViewScope::new();
        assert!(matches!(
            store.delete(&stray.handle(), EntryId::new(1)).await,
            Err(StoreError::Cancelled)
        ));
        assert_eq!(fake.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ids(&store), vec![1]);
    }

    #[tokio::test]
    async fn slow_load_completing_last_wins_over_delete() {
        let (fake, store, view) = loaded(vec![entry(1, "A", 1), entry(2, "B", 2)]).await;
        let gate = fake.fetch_gate.clone().lock_owned().await;

        let reload = {
            let store = store.clone();
            let handle = view.handle();
            tokio::spawn(async move { store.load(&handle).await })
        };
        wait_for(&fake.fetch_calls, 2).await;

        store.delete(&view.handle(), EntryId::new(2)).await.unwrap();
        assert_eq!(ids(&store), vec![1]);

        drop(gate);
        reload.await.unwrap().unwrap();

        // The stale catalog snapshot was applied last, so it wins.
        assert_eq!(ids(&store), vec![1, 2]);
    }
}
