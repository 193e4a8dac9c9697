// api/http.rs — `BackendClient` over HTTP.
//
// RUST NOTE: `ureq` is a blocking client. Each request runs on tokio's
// blocking thread pool via `spawn_blocking`, so an await point never parks a
// runtime worker on socket I/O. The `Agent` is cheap to clone (it is an Arc
// around a connection pool), so every task gets its own handle.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::envelope::{self, ApiResponse};
use super::BackendClient;
use crate::error::{Error, Result};
use crate::models::{
    Game, GameInput, GameStatus, LibraryEntry, LibraryProfile, LibraryStats, MetadataFeed,
    MetadataGame, ServerStats,
};

#[derive(Clone)]
pub struct HttpBackend {
    agent:     ureq::Agent,
    games_url: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend").field("games_url", &self.games_url).finish()
    }
}

/// One outgoing request, owned so it can cross into the blocking pool.
struct Request {
    method: &'static str,
    path:   String,
    query:  Vec<(&'static str, String)>,
    body:   Option<String>,
}

impl Request {
    fn get(path: impl Into<String>) -> Self {
        Self { method: "GET", path: path.into(), query: Vec::new(), body: None }
    }

    /// Action endpoints take an empty JSON object as their body.
    fn post(path: impl Into<String>) -> Self {
        Self { method: "POST", path: path.into(), query: Vec::new(), body: Some("{}".to_string()) }
    }

    fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn with_json(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

impl HttpBackend {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            games_url: format!("{}/games", base_url.trim_end_matches('/')),
        }
    }

    pub fn games_url(&self) -> &str {
        &self.games_url
    }

    async fn send<T>(&self, request: Request) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = if request.path.is_empty() {
            self.games_url.clone()
        } else {
            format!("{}/{}", self.games_url, request.path)
        };

        tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let mut req = agent.request(request.method, &url);
            for (key, value) in &request.query {
                req = req.query(key, value);
            }
            let outcome = match &request.body {
                Some(body) => req.set("Content-Type", "application/json").send_string(body),
                None => req.call(),
            };
            tracing::debug!(
                method = request.method,
                %url,
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = outcome.is_ok(),
                "backend request"
            );
            let text = outcome?.into_string()?;
            envelope::decode(&text)
        })
        .await
        .map_err(|e| Error::Internal(format!("request task failed: {e}")))?
    }

    /// Missing `data` is an empty list.
    async fn list<T>(&self, request: Request) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(self.send::<Vec<T>>(request).await?.into_data()?.unwrap_or_default())
    }

    /// Missing `data` and HTTP 404 are both "not found".
    async fn single<T>(&self, request: Request) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.send::<T>(request).await {
            Ok(envelope) => envelope.into_data(),
            Err(Error::Api { code: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn list_games(&self) -> Result<Vec<Game>> {
        self.list(Request::get("")).await
    }

    async fn get_game(&self, id: i64) -> Result<Option<Game>> {
        self.single(Request::get(id.to_string())).await
    }

    async fn create_game(&self, input: &GameInput) -> Result<Option<Game>> {
        let body = serde_json::to_string(input)?;
        self.single(Request::post("").with_json(body)).await
    }

    async fn update_game(&self, id: i64, input: &GameInput) -> Result<Option<Game>> {
        let body = serde_json::to_string(input)?;
        let request = Request { method: "PUT", ..Request::post(id.to_string()) }.with_json(body);
        self.single(request).await
    }

    async fn delete_game(&self, id: i64) -> Result<()> {
        let request = Request { method: "DELETE", ..Request::get(id.to_string()) };
        self.send::<serde_json::Value>(request).await?.into_data()?;
        Ok(())
    }

    async fn update_status(&self, id: i64, status: GameStatus) -> Result<Option<Game>> {
        self.single(Request::post(format!("{id}/status")).with_query("status", status.as_str()))
            .await
    }

    async fn toggle_favorite(&self, id: i64) -> Result<Option<Game>> {
        self.single(Request::post(format!("{id}/favorite"))).await
    }

    async fn server_stats(&self) -> Result<ServerStats> {
        Ok(self.single(Request::get("stats")).await?.unwrap_or_default())
    }

    async fn search_metadata(&self, query: &str) -> Result<Vec<MetadataGame>> {
        self.list(Request::get("igdb/search").with_query("query", query)).await
    }

    async fn metadata_feed(&self, feed: MetadataFeed, limit: usize) -> Result<Vec<MetadataGame>> {
        self.list(Request::get(format!("igdb/{}", feed.path())).with_query("limit", limit))
            .await
    }

    async fn import_metadata(&self, metadata_id: i64) -> Result<Option<Game>> {
        self.single(Request::post(format!("igdb/import/{metadata_id}"))).await
    }

    async fn refresh_from_metadata(&self, id: i64) -> Result<Option<Game>> {
        self.single(Request::post(format!("{id}/igdb/refresh"))).await
    }

    async fn library_profile(&self) -> Result<Option<LibraryProfile>> {
        self.single(Request::get("steam/user")).await
    }

    async fn library(&self, with_genres: bool) -> Result<Vec<LibraryEntry>> {
        let path = if with_genres { "steam/library/with-genres" } else { "steam/library" };
        self.list(Request::get(path)).await
    }

    async fn library_stats(&self) -> Result<Option<LibraryStats>> {
        self.single(Request::get("steam/library/stats")).await
    }

    async fn sync_library_data(&self, id: i64) -> Result<Option<Game>> {
        self.single(Request::post(format!("{id}/steam/sync"))).await
    }
}
