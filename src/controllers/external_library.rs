// controllers/external_library.rs — Browsing the distribution-platform library
// and importing owned games into the catalog.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::models::{Game, GameInput, LibraryEntry, MetadataGame};
use crate::pipeline;
use crate::pipeline::aggregate::{self, GenreOrder, GenreShare};
use crate::pipeline::filter::{CollectionFilter, FilterCriteria, PlayedFilter};
use crate::pipeline::paginate::{self, Page, PageState};
use crate::pipeline::sort::{collate, library_default_direction, SortKey, SortSpec};
use crate::prefs::{load_preferences, save_preferences, Screen, ViewMode, ViewPreferences};

use super::{AppState, ControllerScope};

/// Flag every entry whose app id is linked from a catalog game.
pub fn mark_in_collection(entries: &mut [LibraryEntry], catalog: &[Game]) {
    let linked: HashMap<&str, Option<i64>> = catalog
        .iter()
        .filter_map(|g| g.library_app_id.as_deref().map(|app| (app, g.id)))
        .collect();
    for entry in entries {
        if let Some(game_id) = linked.get(entry.app_id.as_str()) {
            entry.in_collection = true;
            entry.catalog_game_id = *game_id;
        }
    }
}

/// Exact (case-insensitive) name or app-id match, else the first result.
pub fn pick_metadata_match<'a>(entry: &LibraryEntry, candidates: &'a [MetadataGame]) -> Option<&'a MetadataGame> {
    let name = entry.name.to_lowercase();
    candidates
        .iter()
        .find(|c| c.name.to_lowercase() == name || c.library_app_id.as_deref() == Some(entry.app_id.as_str()))
        .or_else(|| candidates.first())
}

pub struct ExternalLibraryController {
    state:       AppState,
    scope:       ControllerScope,
    entries:     Vec<LibraryEntry>,
    criteria:    FilterCriteria,
    prefs:       ViewPreferences,
    page:        PageState,
    visible:     Vec<LibraryEntry>,
    genre_order: GenreOrder,
    genres:      Vec<GenreShare>,
}

impl ExternalLibraryController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        let prefs = load_preferences(state.prefs.as_ref(), Screen::Library);
        Self {
            state,
            scope,
            entries: Vec::new(),
            criteria: FilterCriteria::default(),
            page: PageState::new(prefs.page_size),
            prefs,
            visible: Vec::new(),
            genre_order: GenreOrder::default(),
            genres: Vec::new(),
        }
    }

    /// Library and catalog side by side; a failed catalog fetch only means no
    /// entry is marked as already collected.
    pub async fn load(&mut self) -> Result<()> {
        let backend = self.state.backend.clone();
        let (entries, catalog) = tokio::join!(
            self.scope.settle("Steam library", backend.library(true)),
            self.scope.settle("your games", backend.list_games()),
        );
        let (Some(mut entries), Some(catalog)) = (entries, catalog) else {
            return Err(Error::Cancelled);
        };
        mark_in_collection(&mut entries, &catalog);
        self.entries = entries;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.visible = pipeline::view(&self.entries, &self.criteria, &self.prefs.sort);
        self.page.clamp(self.visible.len());
        self.recompute_genres();
    }

    /// Genre rows describe the whole library so the tag chips stay stable
    /// while filtering by them.
    fn recompute_genres(&mut self) {
        self.genres = aggregate::genre_breakdown(
            &self.entries,
            |e| e.genres.as_slice(),
            |e| e.playtime_forever as f64,
            self.genre_order,
        );
    }

    fn refilter(&mut self) {
        self.page.reset();
        self.recompute();
    }

    // -- filters -----------------------------------------------------------

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.term = term.into();
        self.refilter();
    }

    pub fn set_played(&mut self, played: PlayedFilter) {
        self.criteria.played = played;
        self.refilter();
    }

    pub fn set_collection(&mut self, collection: CollectionFilter) {
        self.criteria.collection = collection;
        self.refilter();
    }

    pub fn toggle_genre(&mut self, tag: &str) {
        self.criteria.toggle_genre_tag(tag);
        self.refilter();
    }

    pub fn clear_genres(&mut self) {
        self.criteria.genre_tags.clear();
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.refilter();
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters()
    }

    /// Every genre tag in the library, for the filter chips.
    pub fn all_genres(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.entries.iter().flat_map(|e| e.genres.iter()).collect();
        let mut tags: Vec<String> = tags.into_iter().cloned().collect();
        tags.sort_by(|a, b| collate(a, b));
        tags
    }

    pub fn set_genre_order(&mut self, order: GenreOrder) {
        self.genre_order = order;
        aggregate::order_genres(&mut self.genres, order);
    }

    // -- sort --------------------------------------------------------------

    fn persist(&self) {
        save_preferences(self.state.prefs.as_ref(), Screen::Library, &self.prefs);
    }

    fn check_sort_key(key: SortKey) -> Result<()> {
        if !SortKey::LIBRARY.contains(&key) {
            return Err(Error::InvalidInput(format!("cannot sort the library by {key}")));
        }
        Ok(())
    }

    /// Same key flips the direction; a new key starts ascending for names
    /// and descending for numbers.
    pub fn select_sort(&mut self, key: SortKey) -> Result<()> {
        Self::check_sort_key(key)?;
        self.prefs.sort.select(key, library_default_direction);
        self.persist();
        self.refilter();
        Ok(())
    }

    /// Replace the ordering outright; setting the same spec twice changes nothing.
    pub fn set_sort(&mut self, spec: SortSpec) -> Result<()> {
        Self::check_sort_key(spec.key)?;
        self.prefs.sort = spec;
        self.persist();
        self.refilter();
        Ok(())
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.prefs.view_mode = self.prefs.view_mode.toggled();
        self.persist();
        self.prefs.view_mode
    }

    pub fn view_mode(&self) -> ViewMode {
        self.prefs.view_mode
    }

    // -- pagination --------------------------------------------------------

    pub fn page(&self) -> Page<'_, LibraryEntry> {
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

    // -- import ------------------------------------------------------------

    /// Add an owned game to the catalog.
    ///
    /// The metadata service is searched by name first; with no usable match
    /// (or a failed search) a bare record is created from the library entry.
    /// On success the entry is flagged locally, without refetching.
    pub async fn import(&mut self, app_id: &str) -> Result<Game> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.app_id == app_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("library app {app_id}")))?;
        if entry.in_collection {
            return Err(Error::InvalidInput(format!("{} is already in your collection", entry.name)));
        }

        let candidates = match self.scope.run(self.state.backend.search_metadata(&entry.name)).await {
            Ok(found) => found,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(app_id, error = %e, "metadata search failed, creating a basic record");
                Vec::new()
            }
        };

        let matched_id = pick_metadata_match(&entry, &candidates).and_then(|m| m.metadata_id);
        let result = match matched_id {
            Some(metadata_id) => {
                tracing::debug!(app_id, metadata_id, "importing from metadata match");
                self.scope.run(self.state.backend.import_metadata(metadata_id)).await
            }
            None => {
                let input = GameInput {
                    title: entry.name.clone(),
                    library_app_id: Some(entry.app_id.clone()),
                    cover_image_url: entry.icon_url(),
                    ..Default::default()
                };
                self.scope.run(self.state.backend.create_game(&input)).await
            }
        };

        let game = match result {
            Ok(Some(game)) if game.id.is_some() => game,
            Ok(_) => {
                self.state.notifier.error("Error adding game to backlog");
                return Err(Error::Internal("backend returned no game id".to_string()));
            }
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(app_id, error = %e, "import failed");
                    self.state.notifier.error("Error adding game to backlog");
                }
                return Err(e);
            }
        };

        if let Some(slot) = self.entries.iter_mut().find(|e| e.app_id == app_id) {
            slot.in_collection = true;
            slot.catalog_game_id = game.id;
        }
        self.recompute();
        self.state
            .notifier
            .success(&format!("{} added to backlog!", entry.name));
        Ok(game)
    }

    // -- accessors ---------------------------------------------------------

    pub fn close(&self) {
        self.scope.close();
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn visible(&self) -> &[LibraryEntry] {
        &self.visible
    }

    pub fn genres(&self) -> &[GenreShare] {
        &self.genres
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.prefs.sort
    }

    pub fn played_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_played()).count()
    }

    pub fn unplayed_count(&self) -> usize {
        self.entries.len() - self.played_count()
    }

    pub fn in_collection_count(&self) -> usize {
        self.entries.iter().filter(|e| e.in_collection).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, name: &str, app: Option<&str>) -> MetadataGame {
        MetadataGame {
            metadata_id: Some(id),
            name: name.into(),
            library_app_id: app.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_pick_prefers_exact_name_then_app_id_then_first() {
        let entry = LibraryEntry::new("400", "Portal", 0);
        let list = vec![candidate(1, "Portal 2", None), candidate(2, "PORTAL", None)];
        assert_eq!(pick_metadata_match(&entry, &list).unwrap().metadata_id, Some(2));

        let list = vec![candidate(1, "Portal 2", None), candidate(3, "Portal (2007)", Some("400"))];
        assert_eq!(pick_metadata_match(&entry, &list).unwrap().metadata_id, Some(3));

        let list = vec![candidate(5, "Something", None)];
        assert_eq!(pick_metadata_match(&entry, &list).unwrap().metadata_id, Some(5));
        assert!(pick_metadata_match(&entry, &[]).is_none());
    }

    #[test]
    fn test_mark_in_collection_joins_on_app_id() {
        let mut entries = vec![LibraryEntry::new("10", "A", 0), LibraryEntry::new("20", "B", 0)];
        let catalog = vec![Game { id: Some(7), library_app_id: Some("20".into()), ..Game::new("B") }];
        mark_in_collection(&mut entries, &catalog);
        assert!(!entries[0].in_collection);
        assert!(entries[1].in_collection);
        assert_eq!(entries[1].catalog_game_id, Some(7));
    }
}
