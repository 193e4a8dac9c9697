// api/mod.rs — The backend REST API as an async trait.
//
// Controllers only ever see `Arc<dyn BackendClient>`. The production
// implementation is `HttpBackend`; tests plug in an in-memory fake.
//
// Collection calls resolve a missing `data` to an empty list. Single-entity
// calls resolve both a missing `data` and an HTTP 404 to `Ok(None)`.

pub mod envelope;
pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Game, GameInput, GameStatus, LibraryEntry, LibraryProfile, LibraryStats, MetadataFeed,
    MetadataGame, ServerStats,
};

pub use envelope::{ApiResponse, ResponseType};
pub use http::HttpBackend;

/// Default number of results for the curated metadata feeds.
pub const FEED_LIMIT: usize = 20;

#[async_trait]
pub trait BackendClient: Send + Sync {
    // ── Catalog CRUD ────────────────────────────────────────────────────────
    async fn list_games(&self) -> Result<Vec<Game>>;
    async fn get_game(&self, id: i64) -> Result<Option<Game>>;
    async fn create_game(&self, input: &GameInput) -> Result<Option<Game>>;
    async fn update_game(&self, id: i64, input: &GameInput) -> Result<Option<Game>>;
    async fn delete_game(&self, id: i64) -> Result<()>;
    async fn update_status(&self, id: i64, status: GameStatus) -> Result<Option<Game>>;
    async fn toggle_favorite(&self, id: i64) -> Result<Option<Game>>;
    async fn server_stats(&self) -> Result<ServerStats>;

    // ── Metadata service ────────────────────────────────────────────────────
    async fn search_metadata(&self, query: &str) -> Result<Vec<MetadataGame>>;
    async fn metadata_feed(&self, feed: MetadataFeed, limit: usize) -> Result<Vec<MetadataGame>>;
    async fn import_metadata(&self, metadata_id: i64) -> Result<Option<Game>>;
    async fn refresh_from_metadata(&self, id: i64) -> Result<Option<Game>>;

    // ── Distribution-platform library ───────────────────────────────────────
    async fn library_profile(&self) -> Result<Option<LibraryProfile>>;
    async fn library(&self, with_genres: bool) -> Result<Vec<LibraryEntry>>;
    async fn library_stats(&self) -> Result<Option<LibraryStats>>;
    async fn sync_library_data(&self, id: i64) -> Result<Option<Game>>;
}
