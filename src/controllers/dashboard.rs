// controllers/dashboard.rs — The landing screen: quick lists and headline numbers.

use crate::error::{Error, Result};
use crate::models::{Game, GameStatus, ServerStats};
use crate::pipeline::aggregate::{self, CatalogSummary, DashboardLists};

use super::{replace_by_id, AppState, ControllerScope};

pub struct DashboardController {
    state:        AppState,
    scope:        ControllerScope,
    games:        Vec<Game>,
    lists:        DashboardLists,
    summary:      CatalogSummary,
    server_stats: ServerStats,
}

impl DashboardController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        Self {
            state,
            scope,
            games: Vec::new(),
            lists: DashboardLists::default(),
            summary: aggregate::summarize(&[]),
            server_stats: ServerStats::default(),
        }
    }

    /// Games and the backend's statistics are fetched side by side; either
    /// may fail without blanking the other.
    pub async fn load(&mut self) -> Result<()> {
        let backend = self.state.backend.clone();
        let (games, stats) = tokio::join!(
            self.scope.settle("games", backend.list_games()),
            self.scope.settle("statistics", backend.server_stats()),
        );
        let (Some(games), Some(stats)) = (games, stats) else {
            return Err(Error::Cancelled);
        };

        self.games = games;
        self.server_stats = stats;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.lists = DashboardLists::build(&self.games);
        self.summary = aggregate::summarize(&self.games);
    }

    /// Mark a backlog game as in progress and move it to the front of the
    /// "currently playing" list.
    pub async fn start_playing(&mut self, id: i64) -> Result<()> {
        let result = self
            .scope
            .run(self.state.backend.update_status(id, GameStatus::InProgress))
            .await;

        match result {
            Ok(Some(game)) => {
                self.state
                    .notifier
                    .success(&format!("Started playing {}!", game.title));
                replace_by_id(&mut self.games, &game);
                self.summary = aggregate::summarize(&self.games);
                self.lists.start_playing(game);
                Ok(())
            }
            Ok(None) => Err(Error::NotFound(format!("game {id}"))),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to start game");
                self.state.notifier.error("Failed to update game status");
                Err(e)
            }
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }

    pub fn cancel_handle(&self) -> tokio_util::sync::CancellationToken {
        self.scope.cancel_handle()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn lists(&self) -> &DashboardLists {
        &self.lists
    }

    pub fn summary(&self) -> &CatalogSummary {
        &self.summary
    }

    pub fn server_stats(&self) -> &ServerStats {
        &self.server_stats
    }
}
