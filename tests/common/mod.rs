//! In-memory `BackendClient` shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use gameshelf_lib::api::BackendClient;
use gameshelf_lib::controllers::AppState;
use gameshelf_lib::models::{
    Game, GameInput, GameStatus, LibraryEntry, LibraryProfile, LibraryStats, MetadataFeed,
    MetadataGame, ServerStats,
};
use gameshelf_lib::notify::RecordingNotifier;
use gameshelf_lib::prefs::MemoryPreferenceStore;
use gameshelf_lib::{Error, Result};

/// Backend double. Operations named in `failing` return a transport error;
/// every call first sleeps for `delay`.
#[derive(Default)]
pub struct FakeBackend {
    pub games:    Mutex<Vec<Game>>,
    pub library:  Mutex<Vec<LibraryEntry>>,
    pub metadata: Mutex<Vec<MetadataGame>>,
    pub stats:    Mutex<ServerStats>,
    pub failing:  Mutex<HashSet<&'static str>>,
    pub delay:    Mutex<Duration>,
    pub calls:    Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub fn with_games(games: Vec<Game>) -> Self {
        Self { games: Mutex::new(games), ..Default::default() }
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(Error::Transport(format!("{op} unavailable")));
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.games.lock().unwrap().iter().filter_map(|g| g.id).max().unwrap_or(0) + 1
    }

    fn with_game<T>(&self, id: i64, f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        self.games.lock().unwrap().iter_mut().find(|g| g.id == Some(id)).map(f)
    }
}

fn from_input(id: i64, input: &GameInput) -> Game {
    Game {
        id: Some(id),
        title: input.title.clone(),
        description: input.description.clone(),
        developer: input.developer.clone(),
        publisher: input.publisher.clone(),
        release_year: input.release_year,
        genre: input.genre.clone(),
        cover_image_url: input.cover_image_url.clone(),
        platform: input.platform,
        status: input.status,
        rating: input.rating,
        playtime_hours: input.playtime_hours,
        notes: input.notes.clone(),
        favorite: input.favorite,
        library_app_id: input.library_app_id.clone(),
        ..Default::default()
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn list_games(&self) -> Result<Vec<Game>> {
        self.enter("list_games").await?;
        Ok(self.games.lock().unwrap().clone())
    }

    async fn get_game(&self, id: i64) -> Result<Option<Game>> {
        self.enter("get_game").await?;
        Ok(self.with_game(id, |g| g.clone()))
    }

    async fn create_game(&self, input: &GameInput) -> Result<Option<Game>> {
        self.enter("create_game").await?;
        let game = from_input(self.next_id(), input);
        self.games.lock().unwrap().push(game.clone());
        Ok(Some(game))
    }

    async fn update_game(&self, id: i64, input: &GameInput) -> Result<Option<Game>> {
        self.enter("update_game").await?;
        Ok(self.with_game(id, |g| {
            *g = from_input(id, input);
            g.clone()
        }))
    }

    async fn delete_game(&self, id: i64) -> Result<()> {
        self.enter("delete_game").await?;
        let mut games = self.games.lock().unwrap();
        let before = games.len();
        games.retain(|g| g.id != Some(id));
        if games.len() == before {
            return Err(Error::NotFound(format!("game {id}")));
        }
        Ok(())
    }

    async fn update_status(&self, id: i64, status: GameStatus) -> Result<Option<Game>> {
        self.enter("update_status").await?;
        Ok(self.with_game(id, |g| {
            g.status = status;
            g.clone()
        }))
    }

    async fn toggle_favorite(&self, id: i64) -> Result<Option<Game>> {
        self.enter("toggle_favorite").await?;
        Ok(self.with_game(id, |g| {
            g.favorite = !g.favorite;
            g.clone()
        }))
    }

    async fn server_stats(&self) -> Result<ServerStats> {
        self.enter("server_stats").await?;
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn search_metadata(&self, query: &str) -> Result<Vec<MetadataGame>> {
        self.enter("search_metadata").await?;
        let needle = query.to_lowercase();
        Ok(self
            .metadata
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn metadata_feed(&self, _feed: MetadataFeed, limit: usize) -> Result<Vec<MetadataGame>> {
        self.enter("metadata_feed").await?;
        Ok(self.metadata.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn import_metadata(&self, metadata_id: i64) -> Result<Option<Game>> {
        self.enter("import_metadata").await?;
        let Some(found) = self
            .metadata
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.metadata_id == Some(metadata_id))
            .cloned()
        else {
            return Ok(None);
        };
        let game = Game {
            id: Some(self.next_id()),
            metadata_id: Some(metadata_id),
            library_app_id: found.library_app_id.clone(),
            ..Game::new(found.name)
        };
        self.games.lock().unwrap().push(game.clone());
        Ok(Some(game))
    }

    async fn refresh_from_metadata(&self, id: i64) -> Result<Option<Game>> {
        self.enter("refresh_from_metadata").await?;
        Ok(self.with_game(id, |g| g.clone()))
    }

    async fn library_profile(&self) -> Result<Option<LibraryProfile>> {
        self.enter("library_profile").await?;
        Ok(Some(LibraryProfile { persona_name: "tester".into(), ..Default::default() }))
    }

    async fn library(&self, _with_genres: bool) -> Result<Vec<LibraryEntry>> {
        self.enter("library").await?;
        Ok(self.library.lock().unwrap().clone())
    }

    async fn library_stats(&self) -> Result<Option<LibraryStats>> {
        self.enter("library_stats").await?;
        let total = self.library.lock().unwrap().len() as i64;
        Ok(Some(LibraryStats { total_games: total, ..Default::default() }))
    }

    async fn sync_library_data(&self, id: i64) -> Result<Option<Game>> {
        self.enter("sync_library_data").await?;
        Ok(self.with_game(id, |g| {
            g.library_windows_minutes = Some(90);
            g.clone()
        }))
    }
}

pub fn game(id: i64, title: &str, status: GameStatus) -> Game {
    Game { id: Some(id), status, ..Game::new(title) }
}

/// App state over `backend` with an in-memory preference store.
pub fn state(backend: Arc<FakeBackend>) -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(backend, notifier.clone(), Arc::new(MemoryPreferenceStore::default()));
    (state, notifier)
}
