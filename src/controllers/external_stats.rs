// controllers/external_stats.rs — Library-wide playtime statistics.

use crate::error::{Error, Result};
use crate::models::{LibraryEntry, LibraryProfile, LibraryStats};
use crate::pipeline::aggregate::{summarize_library, LibrarySummary, PlaytimeCap};

use super::{AppState, ControllerScope};

pub struct ExternalStatsController {
    state:   AppState,
    scope:   ControllerScope,
    profile: Option<LibraryProfile>,
    stats:   Option<LibraryStats>,
    library: Vec<LibraryEntry>,
    cap:     PlaytimeCap,
    summary: LibrarySummary,
}

impl ExternalStatsController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        Self {
            state,
            scope,
            profile: None,
            stats: None,
            library: Vec::new(),
            cap: PlaytimeCap::None,
            summary: LibrarySummary::default(),
        }
    }

    /// Profile, totals and the full library are fetched together.
    pub async fn load(&mut self) -> Result<()> {
        let backend = self.state.backend.clone();
        let (profile, stats, library) = tokio::join!(
            self.scope.settle("Steam profile", backend.library_profile()),
            self.scope.settle("library statistics", backend.library_stats()),
            self.scope.settle("Steam library", backend.library(false)),
        );
        let (Some(profile), Some(stats), Some(library)) = (profile, stats, library) else {
            return Err(Error::Cancelled);
        };
        self.profile = profile;
        self.stats = stats;
        self.library = library;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.summary = summarize_library(&self.library, self.cap, self.library_size());
    }

    /// Uncapped number of games; the backend's figure when it answered.
    pub fn library_size(&self) -> usize {
        self.stats
            .as_ref()
            .map(|s| s.total_games.max(0) as usize)
            .unwrap_or(self.library.len())
    }

    pub fn set_cap(&mut self, cap: PlaytimeCap) {
        self.cap = cap;
        self.recompute();
    }

    pub fn cap(&self) -> PlaytimeCap {
        self.cap
    }

    pub fn profile(&self) -> Option<&LibraryProfile> {
        self.profile.as_ref()
    }

    pub fn stats(&self) -> Option<&LibraryStats> {
        self.stats.as_ref()
    }

    pub fn summary(&self) -> &LibrarySummary {
        &self.summary
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
