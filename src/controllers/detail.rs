// controllers/detail.rs — One game: favorite, status, delete, and the two
// external refreshes.

use crate::error::{Error, Result};
use crate::models::{Game, GameStatus, PlatformPlaytime};

use super::{AppState, ControllerScope};

pub struct DetailController {
    state: AppState,
    scope: ControllerScope,
    game:  Option<Game>,
}

impl DetailController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        Self { state, scope, game: None }
    }

    /// Fetch the game. A missing game leaves the screen empty and says so.
    pub async fn load(&mut self, id: i64) -> Result<Option<&Game>> {
        let game = self
            .scope
            .settle("game", self.state.backend.get_game(id))
            .await
            .ok_or(Error::Cancelled)?;
        if game.is_none() {
            self.state.notifier.error("Game not found");
        }
        self.game = game;
        Ok(self.game.as_ref())
    }

    fn current_id(&self) -> Result<i64> {
        self.game
            .as_ref()
            .and_then(|g| g.id)
            .ok_or_else(|| Error::InvalidInput("no game loaded".to_string()))
    }

    /// Take the backend's copy of the game after a successful mutation.
    fn accept(&mut self, updated: Option<Game>) {
        if let Some(game) = updated {
            self.game = Some(game);
        }
    }

    fn fail(&self, action: &str, error: Error) -> Error {
        if !error.is_cancelled() {
            tracing::warn!(action, error = %error, "detail action failed");
            self.state.notifier.error(&format!("Failed to {action}"));
        }
        error
    }

    /// Optimistic: the flag flips before the request and flips back if it fails.
    ///
    /// A cancelled request flips back as well, even though the backend may
    /// have applied it. The closed controller is discarded; the next detail
    /// screen's `load` reads the settled flag.
    pub async fn toggle_favorite(&mut self) -> Result<()> {
        let id = self.current_id()?;
        let previous = match self.game.as_mut() {
            Some(game) => {
                let before = game.favorite;
                game.favorite = !before;
                before
            }
            None => return Err(Error::InvalidInput("no game loaded".to_string())),
        };

        match self.scope.run(self.state.backend.toggle_favorite(id)).await {
            Ok(updated) => {
                self.accept(updated);
                Ok(())
            }
            Err(e) => {
                if let Some(game) = self.game.as_mut() {
                    game.favorite = previous;
                }
                Err(self.fail("update favorite", e))
            }
        }
    }

    pub async fn update_status(&mut self, status: GameStatus) -> Result<()> {
        let id = self.current_id()?;
        match self.scope.run(self.state.backend.update_status(id, status)).await {
            Ok(updated) => {
                self.accept(updated);
                self.state
                    .notifier
                    .success(&format!("Status updated to {}", status.label()));
                Ok(())
            }
            Err(e) => Err(self.fail("update status", e)),
        }
    }

    /// Returns whether the game was deleted.
    pub async fn delete(&mut self, confirm: impl FnOnce(&Game) -> bool) -> Result<bool> {
        let id = self.current_id()?;
        let Some(game) = self.game.as_ref() else {
            return Ok(false);
        };
        if !confirm(game) {
            return Ok(false);
        }
        let title = game.title.clone();
        match self.scope.run(self.state.backend.delete_game(id)).await {
            Ok(()) => {
                self.game = None;
                self.state.notifier.success(&format!("{title} deleted"));
                Ok(true)
            }
            Err(e) => Err(self.fail("delete game", e)),
        }
    }

    /// Pull fresh playtime and achievements from the distribution platform.
    pub async fn sync_library_data(&mut self) -> Result<()> {
        let id = self.current_id()?;
        if !self.game.as_ref().is_some_and(Game::has_library_data) {
            return Err(Error::InvalidInput("game has no linked library app".to_string()));
        }
        match self.scope.run(self.state.backend.sync_library_data(id)).await {
            Ok(updated) => {
                self.accept(updated);
                self.state.notifier.success("Steam data synced");
                Ok(())
            }
            Err(e) => Err(self.fail("sync Steam data", e)),
        }
    }

    pub async fn refresh_from_metadata(&mut self) -> Result<()> {
        let id = self.current_id()?;
        if self.game.as_ref().and_then(|g| g.metadata_id).is_none() {
            return Err(Error::InvalidInput("game has no linked metadata entry".to_string()));
        }
        match self.scope.run(self.state.backend.refresh_from_metadata(id)).await {
            Ok(updated) => {
                self.accept(updated);
                self.state.notifier.success("Game details refreshed");
                Ok(())
            }
            Err(e) => Err(self.fail("refresh game details", e)),
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn achievement_progress(&self) -> u32 {
        self.game.as_ref().map(Game::achievement_progress).unwrap_or(0)
    }

    pub fn playtime_breakdown(&self) -> Vec<PlatformPlaytime> {
        self.game.as_ref().map(Game::playtime_breakdown).unwrap_or_default()
    }
}
