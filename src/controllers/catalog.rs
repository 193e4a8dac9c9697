// controllers/catalog.rs — The full game list: search, filters, sort, pages.
//
// Every criteria or sort change resets to the first page and re-runs
// filter → sort; the page is sliced on demand. Summary numbers always describe
// the filtered (not paginated) list.

use crate::error::{Error, Result};
use crate::models::{Game, GamePlatform, GameStatus};
use crate::pipeline::aggregate::{self, CatalogSummary};
use crate::pipeline::filter::FilterCriteria;
use crate::pipeline::paginate::{self, Page, PageState, CATALOG_PAGE_SIZES};
use crate::pipeline::sort::{catalog_default_direction, collate, SortKey, SortSpec};
use crate::pipeline;
use crate::prefs::{load_preferences, save_preferences, Screen, ViewMode, ViewPreferences};

use super::{replace_by_id, AppState, ControllerScope};

pub struct CatalogController {
    state:    AppState,
    scope:    ControllerScope,
    games:    Vec<Game>,
    criteria: FilterCriteria,
    prefs:    ViewPreferences,
    page:     PageState,
    visible:  Vec<Game>,
    summary:  CatalogSummary,
}

impl CatalogController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        let prefs = load_preferences(state.prefs.as_ref(), Screen::Catalog);
        Self {
            state,
            scope,
            games: Vec::new(),
            criteria: FilterCriteria::default(),
            page: PageState::new(prefs.page_size),
            prefs,
            visible: Vec::new(),
            summary: aggregate::summarize(&[]),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        let games = self
            .scope
            .settle("games", self.state.backend.list_games())
            .await
            .ok_or(Error::Cancelled)?;
        self.games = games;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.visible = pipeline::view(&self.games, &self.criteria, &self.prefs.sort);
        self.page.clamp(self.visible.len());
        self.summary = aggregate::summarize(&self.visible);
    }

    /// Criteria changed: back to page one.
    fn refilter(&mut self) {
        self.page.reset();
        self.recompute();
    }

    fn persist(&self) {
        save_preferences(self.state.prefs.as_ref(), Screen::Catalog, &self.prefs);
    }

    // -- filters -----------------------------------------------------------

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.term = term.into();
        self.refilter();
    }

    pub fn set_status(&mut self, status: Option<GameStatus>) {
        self.criteria.status = status;
        self.refilter();
    }

    pub fn set_platform(&mut self, platform: Option<GamePlatform>) {
        self.criteria.platform = platform;
        self.refilter();
    }

    pub fn set_genre(&mut self, genre: Option<String>) {
        self.criteria.genre = genre.filter(|g| !g.trim().is_empty());
        self.refilter();
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.criteria.favorites_only = favorites_only;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.refilter();
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }

    /// Distinct `genre` values in the catalog for the filter dropdown.
    pub fn genre_options(&self) -> Vec<String> {
        let mut genres: Vec<String> = self
            .games
            .iter()
            .filter_map(|g| g.genre.clone())
            .filter(|g| !g.trim().is_empty())
            .collect();
        genres.sort_by(|a, b| collate(a, b));
        genres.dedup();
        genres
    }

    // -- sort / view -------------------------------------------------------

    /// Same key flips the direction, a new key starts ascending.
    pub fn select_sort(&mut self, key: SortKey) {
        self.prefs.sort.select(key, catalog_default_direction);
        self.persist();
        self.refilter();
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.prefs.sort = spec;
        self.persist();
        self.refilter();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.prefs.sort.direction = self.prefs.sort.direction.toggled();
        self.persist();
        self.refilter();
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.prefs.view_mode = self.prefs.view_mode.toggled();
        self.persist();
        self.prefs.view_mode
    }

    // -- pagination --------------------------------------------------------

    pub fn page(&self) -> Page<'_, Game> {
        paginate::slice(&self.visible, &self.page)
    }

    pub fn go_to_page(&mut self, page_index: usize) -> bool {
        self.page.go_to(page_index, self.visible.len())
    }

    pub fn next_page(&mut self) -> bool {
        self.page.next(self.visible.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.page.prev(self.visible.len())
    }

    pub fn first_page(&mut self) -> bool {
        self.page.first(self.visible.len())
    }

    pub fn last_page(&mut self) -> bool {
        self.page.last(self.visible.len())
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if !CATALOG_PAGE_SIZES.contains(&page_size) {
            return Err(Error::InvalidInput(format!(
                "page size must be one of {CATALOG_PAGE_SIZES:?}, got {page_size}"
            )));
        }
        self.page.set_page_size(page_size);
        self.prefs.page_size = page_size;
        self.persist();
        Ok(())
    }

    // -- mutations ---------------------------------------------------------

    /// Flip the favorite flag locally, then confirm with the backend. A
    /// failed request restores the previous flag.
    ///
    /// Cancellation restores it too, although the backend may already have
    /// applied the toggle. A cancelled controller is closed for good, so the
    /// stale copy is dropped with it; the next screen's `load` reads the
    /// backend's version.
    pub async fn toggle_favorite(&mut self, id: i64) -> Result<()> {
        let previous = self
            .games
            .iter_mut()
            .find(|g| g.id == Some(id))
            .map(|g| {
                let before = g.favorite;
                g.favorite = !before;
                before
            })
            .ok_or_else(|| Error::NotFound(format!("game {id}")))?;
        self.recompute();

        let result = self.scope.run(self.state.backend.toggle_favorite(id)).await;
        match result {
            Ok(Some(updated)) => {
                let message = if updated.favorite { "Added to favorites" } else { "Removed from favorites" };
                replace_by_id(&mut self.games, &updated);
                self.recompute();
                self.state.notifier.success(message);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                if let Some(game) = self.games.iter_mut().find(|g| g.id == Some(id)) {
                    game.favorite = previous;
                }
                self.recompute();
                if !e.is_cancelled() {
                    tracing::warn!(id, error = %e, "favorite toggle failed, reverted");
                    self.state.notifier.error("Failed to update favorite");
                }
                Err(e)
            }
        }
    }

    /// Ask `confirm`, delete, then reload the list. Returns whether a delete
    /// happened.
    pub async fn delete(&mut self, id: i64, confirm: impl FnOnce(&Game) -> bool) -> Result<bool> {
        let game = self
            .games
            .iter()
            .find(|g| g.id == Some(id))
            .ok_or_else(|| Error::NotFound(format!("game {id}")))?;
        if !confirm(game) {
            return Ok(false);
        }
        let title = game.title.clone();

        match self.scope.run(self.state.backend.delete_game(id)).await {
            Ok(()) => {
                self.state.notifier.success(&format!("{title} deleted"));
                self.load().await?;
                Ok(true)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(id, error = %e, "delete failed");
                    self.state.notifier.error("Failed to delete game");
                }
                Err(e)
            }
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn close(&self) {
        self.scope.close();
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Filtered and sorted, before pagination.
    pub fn visible(&self) -> &[Game] {
        &self.visible
    }

    pub fn summary(&self) -> &CatalogSummary {
        &self.summary
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn preferences(&self) -> &ViewPreferences {
        &self.prefs
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }
}
