// controllers/external_search.rs — Searching and browsing the metadata service.

use std::collections::{HashMap, HashSet};

use crate::api::FEED_LIMIT;
use crate::error::{Error, Result};
use crate::models::{Game, MetadataFeed, MetadataGame};

use super::{AppState, ControllerScope};

/// Queries shorter than this (after trimming) clear the results instead of searching.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchTab {
    #[default]
    Search,
    Popular,
    Recent,
    Upcoming,
}

impl SearchTab {
    pub const ALL: [SearchTab; 4] = [SearchTab::Search, SearchTab::Popular, SearchTab::Recent, SearchTab::Upcoming];

    fn feed(&self) -> Option<MetadataFeed> {
        match self {
            SearchTab::Search   => None,
            SearchTab::Popular  => Some(MetadataFeed::Popular),
            SearchTab::Recent   => Some(MetadataFeed::Recent),
            SearchTab::Upcoming => Some(MetadataFeed::Upcoming),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchTab::Search   => "Search",
            SearchTab::Popular  => "Popular",
            SearchTab::Recent   => "Recent Releases",
            SearchTab::Upcoming => "Upcoming",
        }
    }
}

pub struct ExternalSearchController {
    state:       AppState,
    scope:       ControllerScope,
    active_tab:  SearchTab,
    results:     HashMap<SearchTab, Vec<MetadataGame>>,
    /// Feed tabs fetched successfully; each is fetched at most once.
    loaded:      HashSet<SearchTab>,
    last_query:  Option<String>,
    catalog_ids: HashSet<i64>,
    added_ids:   HashSet<i64>,
}

impl ExternalSearchController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        Self {
            state,
            scope,
            active_tab: SearchTab::default(),
            results: HashMap::new(),
            loaded: HashSet::new(),
            last_query: None,
            catalog_ids: HashSet::new(),
            added_ids: HashSet::new(),
        }
    }

    /// Learn which metadata ids the catalog already holds, and warm the
    /// popular tab alongside.
    pub async fn load(&mut self) -> Result<()> {
        let backend = self.state.backend.clone();
        let (catalog, popular) = tokio::join!(
            self.scope.settle("your games", backend.list_games()),
            self.scope.run(backend.metadata_feed(MetadataFeed::Popular, FEED_LIMIT)),
        );
        let catalog: Vec<Game> = catalog.ok_or(Error::Cancelled)?;
        self.catalog_ids = catalog.iter().filter_map(|g| g.metadata_id).collect();
        self.store_feed(SearchTab::Popular, popular)
    }

    fn store_feed(&mut self, tab: SearchTab, fetched: Result<Vec<MetadataGame>>) -> Result<()> {
        match fetched {
            Ok(games) => {
                self.results.insert(tab, games);
                self.loaded.insert(tab);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                self.scope.report(&format!("{} games", tab.label().to_lowercase()), &e);
                Ok(())
            }
        }
    }

    /// Switch tabs, fetching a feed the first time it is shown.
    pub async fn select_tab(&mut self, tab: SearchTab) -> Result<()> {
        self.active_tab = tab;
        let Some(feed) = tab.feed() else {
            return Ok(());
        };
        if self.loaded.contains(&tab) {
            return Ok(());
        }
        let fetched = self
            .scope
            .run(self.state.backend.metadata_feed(feed, FEED_LIMIT))
            .await;
        self.store_feed(tab, fetched)
    }

    /// Run a search unless the query repeats the previous one. Returns whether
    /// a request was made.
    pub async fn search(&mut self, query: &str) -> Result<bool> {
        let query = query.trim();
        if self.last_query.as_deref() == Some(query) {
            return Ok(false);
        }
        self.last_query = Some(query.to_string());
        self.active_tab = SearchTab::Search;

        if query.chars().count() < MIN_QUERY_CHARS {
            self.results.insert(SearchTab::Search, Vec::new());
            return Ok(false);
        }

        match self.scope.run(self.state.backend.search_metadata(query)).await {
            Ok(found) => {
                self.results.insert(SearchTab::Search, found);
                Ok(true)
            }
            Err(Error::Cancelled) => {
                self.last_query = None;
                Err(Error::Cancelled)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "metadata search failed");
                self.state.notifier.error("Error searching games");
                // a failed query may be retried as-is
                self.last_query = None;
                self.results.insert(SearchTab::Search, Vec::new());
                Ok(true)
            }
        }
    }

    /// Import a search result into the catalog.
    pub async fn import(&mut self, metadata_id: i64) -> Result<Option<Game>> {
        let name = SearchTab::ALL
            .iter()
            .filter_map(|tab| self.results.get(tab))
            .flatten()
            .find(|g| g.metadata_id == Some(metadata_id))
            .map(|g| g.name.clone());

        match self.scope.run(self.state.backend.import_metadata(metadata_id)).await {
            Ok(game) => {
                self.added_ids.insert(metadata_id);
                let message = match name.or_else(|| game.as_ref().map(|g| g.title.clone())) {
                    Some(name) => format!("{name} added to your library!"),
                    None => "Game added to your library!".to_string(),
                };
                self.state.notifier.success(&message);
                Ok(game)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(metadata_id, error = %e, "import failed");
                    self.state.notifier.error("Error adding game");
                }
                Err(e)
            }
        }
    }

    /// Already in the catalog, or imported during this session.
    pub fn is_in_catalog(&self, metadata_id: i64) -> bool {
        self.catalog_ids.contains(&metadata_id) || self.added_ids.contains(&metadata_id)
    }

    pub fn active_tab(&self) -> SearchTab {
        self.active_tab
    }

    pub fn results(&self, tab: SearchTab) -> &[MetadataGame] {
        self.results.get(&tab).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_results(&self) -> &[MetadataGame] {
        self.results(self.active_tab)
    }

    pub fn is_loaded(&self, tab: SearchTab) -> bool {
        self.loaded.contains(&tab)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
