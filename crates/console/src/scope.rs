//! View lifetimes for asynchronous store operations.
//!
//! Every view that calls into the store opens a [`ViewScope`] and passes
//! [`ViewHandle`]s from it to store operations. Dropping (or closing) the scope
//! abandons the view's in-flight requests, and the store refuses to apply a
//! completion whose handle is no longer live.

use tokio_util::sync::CancellationToken;

/// Owned by a view for as long as it is mounted. Releases on drop.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    /// Standalone scope, not tied to any store.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub(crate) fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Handle to pass to store operations started by this view.
    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            token: self.token.clone(),
        }
    }

    /// Tear the view down explicitly.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Cheap, cloneable liveness token for one view.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    token: CancellationToken,
}

impl ViewHandle {
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Release the view early (same effect as closing its scope).
    pub fn release(&self) {
        self.token.cancel();
    }

    /// Resolves once the view is gone.
    pub async fn released(&self) {
        self.token.cancelled().await
    }
}
