// controllers/mod.rs — One controller per screen, plus the plumbing they share.
//
// A controller owns its collections, filter criteria, sort spec and page
// state. Fetches go through its `ControllerScope`, which races each request
// against the controller's cancellation token: once the controller is closed
// (or dropped) nothing that was in flight may touch its state.

pub mod catalog;
pub mod dashboard;
pub mod detail;
pub mod external_library;
pub mod external_search;
pub mod external_stats;
pub mod form;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::BackendClient;
use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::prefs::PreferenceStore;

pub use catalog::CatalogController;
pub use dashboard::DashboardController;
pub use detail::DetailController;
pub use external_library::ExternalLibraryController;
pub use external_search::{ExternalSearchController, SearchTab};
pub use external_stats::ExternalStatsController;
pub use form::{FormController, FormMode, GameForm};

/// Shared collaborators every controller is built from.
/// RUST NOTE: `Arc<dyn Trait>` lets the binary hand in the HTTP client and
/// SQLite store while tests hand in fakes, with no generics leaking into
/// every controller signature.
#[derive(Clone)]
pub struct AppState {
    pub backend:  Arc<dyn BackendClient>,
    pub notifier: Arc<dyn Notifier>,
    pub prefs:    Arc<dyn PreferenceStore>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        notifier: Arc<dyn Notifier>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self { backend, notifier, prefs }
    }
}

// ---------------------------------------------------------------------------
// Scope: cancellation + failure reporting
// ---------------------------------------------------------------------------

pub struct ControllerScope {
    token:    CancellationToken,
    notifier: Arc<dyn Notifier>,
}

impl ControllerScope {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { token: CancellationToken::new(), notifier }
    }

    /// A handle another task can use to close the controller.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Await `fut` unless the scope closes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }

    /// Await a fetch whose failure should not stop the screen.
    ///
    /// Failures are logged, shown to the user and replaced by `T::default()`.
    /// Returns `None` only when the scope was closed, in which case the caller
    /// must leave its state alone.
    pub async fn settle<T, F>(&self, what: &str, fut: F) -> Option<T>
    where
        T: Default,
        F: Future<Output = Result<T>>,
    {
        match self.run(fut).await {
            Ok(value) => Some(value),
            Err(Error::Cancelled) => {
                tracing::debug!(what, "fetch cancelled");
                None
            }
            Err(e) => {
                self.report(what, &e);
                Some(T::default())
            }
        }
    }

    /// Log a failed fetch and tell the user.
    pub fn report(&self, what: &str, error: &Error) {
        tracing::warn!(what, error = %error, "fetch failed");
        self.notifier.error(&format!("Failed to load {what}"));
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

impl Drop for ControllerScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Replace the record with the same id, if present.
pub(crate) fn replace_by_id(games: &mut [crate::models::Game], updated: &crate::models::Game) -> bool {
    match games.iter_mut().find(|g| g.id.is_some() && g.id == updated.id) {
        Some(slot) => {
            *slot = updated.clone();
            true
        }
        None => false,
    }
}
