//! Screen controllers driven against the in-memory backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use gameshelf_lib::controllers::{
    AppState, CatalogController, DashboardController, DetailController, ExternalLibraryController,
    ExternalSearchController, ExternalStatsController, FormController, FormMode, SearchTab,
};
use gameshelf_lib::models::{GameStatus, LibraryEntry, MetadataGame};
use gameshelf_lib::notify::{NoticeLevel, RecordingNotifier};
use gameshelf_lib::pipeline::aggregate::PlaytimeCap;
use gameshelf_lib::pipeline::{CollectionFilter, SortDirection, SortKey, SortSpec};
use gameshelf_lib::prefs::{MemoryPreferenceStore, ViewMode};
use gameshelf_lib::Error;

use common::{game, state, FakeBackend};

fn catalog_backend() -> Arc<FakeBackend> {
    Arc::new(FakeBackend::with_games(vec![
        game(1, "Hades", GameStatus::Completed),
        game(2, "Celeste", GameStatus::InProgress),
        game(3, "Outer Wilds", GameStatus::NotStarted),
        game(4, "Disco Elysium", GameStatus::NotStarted),
    ]))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn favorite_toggle_is_rolled_back_when_the_backend_fails() {
    let backend = catalog_backend();
    backend.fail("toggle_favorite");
    let (state, notifier) = state(backend.clone());

    let mut catalog = CatalogController::new(state);
    catalog.load().await.unwrap();

    let result = catalog.toggle_favorite(2).await;
    assert_matches!(result, Err(Error::Transport(_)));
    let celeste = catalog.games().iter().find(|g| g.id == Some(2)).unwrap();
    assert!(!celeste.favorite);
    assert!(notifier.has_error());
}

#[tokio::test]
async fn favorite_toggle_keeps_the_backend_copy() {
    let backend = catalog_backend();
    let (state, notifier) = state(backend.clone());

    let mut catalog = CatalogController::new(state);
    catalog.load().await.unwrap();
    catalog.toggle_favorite(3).await.unwrap();

    assert!(catalog.games().iter().any(|g| g.id == Some(3) && g.favorite));
    assert_eq!(catalog.summary().favorites, 1);
    assert_eq!(notifier.notices()[0].message, "Added to favorites");
}

#[tokio::test]
async fn cancelled_favorite_toggle_reverts_until_the_next_screen_loads() {
    let backend = catalog_backend();
    let (state, notifier) = state(backend.clone());

    let mut catalog = CatalogController::new(state.clone());
    catalog.load().await.unwrap();
    catalog.close();

    assert_matches!(catalog.toggle_favorite(2).await, Err(Error::Cancelled));
    assert!(catalog.games().iter().any(|g| g.id == Some(2) && !g.favorite));
    assert!(!notifier.has_error());

    // the backend settled the toggle anyway
    backend.games.lock().unwrap().iter_mut().filter(|g| g.id == Some(2)).for_each(|g| g.favorite = true);

    let mut reopened = CatalogController::new(state);
    reopened.load().await.unwrap();
    assert!(reopened.games().iter().any(|g| g.id == Some(2) && g.favorite));
}

#[tokio::test]
async fn filter_and_sort_reset_to_the_first_page() {
    let backend = Arc::new(FakeBackend::with_games(
        (1..=30).map(|i| game(i, &format!("Game {i:02}"), GameStatus::NotStarted)).collect(),
    ));
    let (state, _) = state(backend);

    let mut catalog = CatalogController::new(state);
    catalog.load().await.unwrap();
    assert_eq!(catalog.page().total_pages, 3);

    assert!(catalog.go_to_page(2));
    assert_eq!(catalog.page().items.len(), 6);

    catalog.set_search("game 1");
    assert_eq!(catalog.page_state().page_index, 0);
    assert_eq!(catalog.visible().len(), 10);

    catalog.select_sort(SortKey::Title);
    assert_eq!(catalog.visible()[0].title, "Game 19");
}

#[tokio::test]
async fn delete_asks_first_and_reloads() {
    let backend = catalog_backend();
    let (state, notifier) = state(backend.clone());

    let mut catalog = CatalogController::new(state);
    catalog.load().await.unwrap();

    assert!(!catalog.delete(1, |_| false).await.unwrap());
    assert_eq!(backend.call_count("delete_game"), 0);

    assert!(catalog.delete(1, |g| g.title == "Hades").await.unwrap());
    assert_eq!(catalog.games().len(), 3);
    assert_eq!(notifier.notices()[0].message, "Hades deleted");
}

#[tokio::test]
async fn closed_controller_ignores_late_results() {
    let backend = catalog_backend();
    let (state, _) = state(backend);

    let mut catalog = CatalogController::new(state);
    catalog.close();
    assert_matches!(catalog.load().await, Err(Error::Cancelled));
    assert!(catalog.games().is_empty());
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_statistics_do_not_block_the_game_lists() {
    let backend = catalog_backend();
    backend.fail("server_stats");
    let (state, notifier) = state(backend);

    let mut dashboard = DashboardController::new(state);
    dashboard.load().await.unwrap();

    assert_eq!(dashboard.games().len(), 4);
    assert_eq!(dashboard.lists().backlog.len(), 2);
    assert_eq!(dashboard.server_stats().total_games, 0);
    assert_eq!(notifier.notices()[0].message, "Failed to load statistics");
}

#[tokio::test]
async fn cancelling_mid_fetch_leaves_state_untouched() {
    let backend = catalog_backend();
    backend.set_delay(Duration::from_secs(5));
    let (state, _) = state(backend);

    let mut dashboard = DashboardController::new(state);
    let handle = dashboard.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    assert_matches!(dashboard.load().await, Err(Error::Cancelled));
    assert!(dashboard.games().is_empty());
    assert!(dashboard.lists().in_progress.is_empty());
}

#[tokio::test]
async fn start_playing_moves_a_backlog_game() {
    let backend = catalog_backend();
    let (state, notifier) = state(backend);

    let mut dashboard = DashboardController::new(state);
    dashboard.load().await.unwrap();
    dashboard.start_playing(3).await.unwrap();

    let lists = dashboard.lists();
    assert_eq!(lists.in_progress[0].title, "Outer Wilds");
    assert!(lists.backlog.iter().all(|g| g.id != Some(3)));
    assert_eq!(dashboard.summary().count_for(GameStatus::InProgress), 2);
    assert_eq!(notifier.notices()[0].message, "Started playing Outer Wilds!");
}

// ---------------------------------------------------------------------------
// Detail and form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_game_is_reported_not_raised() {
    let (state, notifier) = state(catalog_backend());
    let mut detail = DetailController::new(state);

    assert!(detail.load(99).await.unwrap().is_none());
    assert_eq!(notifier.notices()[0].message, "Game not found");
}

#[tokio::test]
async fn sync_requires_a_linked_app() {
    let (state, _) = state(catalog_backend());
    let mut detail = DetailController::new(state);
    detail.load(1).await.unwrap();

    assert_matches!(detail.sync_library_data().await, Err(Error::InvalidInput(_)));
    assert_matches!(detail.refresh_from_metadata().await, Err(Error::InvalidInput(_)));
}

#[tokio::test]
async fn form_rejects_invalid_values_without_calling_the_backend() {
    let backend = catalog_backend();
    let (state, _) = state(backend.clone());

    let mut form = FormController::new(state);
    form.form.title = "  ".into();
    form.form.rating = Some(11);
    let err = form.submit().await.unwrap_err();
    assert_matches!(err, Error::Validation(ref messages) if messages.len() == 2);
    assert_eq!(backend.call_count("create_game"), 0);
}

#[tokio::test]
async fn form_creates_then_edits() {
    let backend = catalog_backend();
    let (state, _) = state(backend.clone());

    let mut form = FormController::new(state.clone());
    form.form.title = "Tunic".into();
    form.form.rating = Some(9);
    let id = form.submit().await.unwrap();
    assert_eq!(id, 5);
    assert_eq!(form.mode(), FormMode::Edit(5));

    let mut edit = FormController::edit(state, id).await.unwrap();
    assert_eq!(edit.form.title, "Tunic");
    edit.form.status = GameStatus::Completed;
    edit.submit().await.unwrap();

    let games = backend.games.lock().unwrap();
    let tunic = games.iter().find(|g| g.id == Some(5)).unwrap();
    assert_eq!(tunic.status, GameStatus::Completed);
    assert_eq!(tunic.rating, Some(9));
}

// ---------------------------------------------------------------------------
// Metadata search
// ---------------------------------------------------------------------------

fn metadata(id: i64, name: &str) -> MetadataGame {
    MetadataGame { metadata_id: Some(id), name: name.into(), ..Default::default() }
}

#[tokio::test]
async fn repeated_query_is_not_sent_twice() {
    let backend = catalog_backend();
    *backend.metadata.lock().unwrap() = vec![metadata(10, "Hollow Knight"), metadata(11, "Hades")];
    let (state, _) = state(backend.clone());

    let mut search = ExternalSearchController::new(state);
    search.load().await.unwrap();
    assert!(search.is_loaded(SearchTab::Popular));

    assert!(search.search("hollow").await.unwrap());
    assert!(!search.search("  hollow ").await.unwrap());
    assert_eq!(backend.call_count("search_metadata"), 1);
    assert_eq!(search.active_results().len(), 1);

    assert!(!search.search("h").await.unwrap());
    assert!(search.active_results().is_empty());
}

#[tokio::test]
async fn failed_search_can_be_retried_with_the_same_query() {
    let backend = catalog_backend();
    *backend.metadata.lock().unwrap() = vec![metadata(10, "Hollow Knight")];
    backend.fail("search_metadata");
    let (state, notifier) = state(backend.clone());

    let mut search = ExternalSearchController::new(state);
    assert!(search.search("hollow").await.unwrap());
    assert!(search.active_results().is_empty());
    assert!(notifier.has_error());

    backend.failing.lock().unwrap().clear();
    assert!(search.search("hollow").await.unwrap());
    assert_eq!(backend.call_count("search_metadata"), 2);
    assert_eq!(search.active_results().len(), 1);

    assert!(!search.search("hollow").await.unwrap());
    assert_eq!(backend.call_count("search_metadata"), 2);
}

#[tokio::test]
async fn failed_feed_is_fetched_again_next_time() {
    let backend = catalog_backend();
    backend.fail("metadata_feed");
    let (state, notifier) = state(backend.clone());

    let mut search = ExternalSearchController::new(state);
    search.load().await.unwrap();
    assert!(!search.is_loaded(SearchTab::Popular));
    assert!(notifier.has_error());

    backend.failing.lock().unwrap().clear();
    search.select_tab(SearchTab::Popular).await.unwrap();
    search.select_tab(SearchTab::Popular).await.unwrap();
    assert!(search.is_loaded(SearchTab::Popular));
    assert_eq!(backend.call_count("metadata_feed"), 2);
}

#[tokio::test]
async fn imported_result_is_marked_in_catalog() {
    let backend = catalog_backend();
    *backend.metadata.lock().unwrap() = vec![metadata(42, "Tunic")];
    let (state, _) = state(backend);

    let mut search = ExternalSearchController::new(state);
    search.load().await.unwrap();
    assert!(!search.is_in_catalog(42));
    let game = search.import(42).await.unwrap().unwrap();
    assert_eq!(game.title, "Tunic");
    assert!(search.is_in_catalog(42));
}

// ---------------------------------------------------------------------------
// External library
// ---------------------------------------------------------------------------

fn library_backend() -> Arc<FakeBackend> {
    let mut linked = game(1, "Hades", GameStatus::Completed);
    linked.library_app_id = Some("1145360".into());
    let backend = FakeBackend::with_games(vec![linked]);
    *backend.library.lock().unwrap() = vec![
        LibraryEntry::new("1145360", "Hades", 3000),
        LibraryEntry::new("504230", "Celeste", 600),
        LibraryEntry::new("753640", "Outer Wilds", 0),
    ];
    Arc::new(backend)
}

#[tokio::test]
async fn library_marks_entries_already_collected() {
    let (state, _) = state(library_backend());
    let mut lib = ExternalLibraryController::new(state);
    lib.load().await.unwrap();

    assert_eq!(lib.in_collection_count(), 1);
    assert_eq!(lib.played_count(), 2);
    // default sort: most played first
    assert_eq!(lib.visible()[0].name, "Hades");

    lib.set_collection(CollectionFilter::NotInCollection);
    assert_eq!(lib.visible().len(), 2);
}

#[tokio::test]
async fn library_import_uses_metadata_match_and_flips_flag_locally() {
    let backend = library_backend();
    *backend.metadata.lock().unwrap() = vec![metadata(7, "Celeste")];
    let (state, notifier) = state(backend.clone());

    let mut lib = ExternalLibraryController::new(state);
    lib.load().await.unwrap();
    let game = lib.import("504230").await.unwrap();

    assert_eq!(game.metadata_id, Some(7));
    assert_eq!(lib.in_collection_count(), 2);
    assert_eq!(backend.call_count("library"), 1);
    assert_eq!(notifier.notices()[0].message, "Celeste added to backlog!");
}

#[tokio::test]
async fn library_import_falls_back_to_a_basic_record() {
    let backend = library_backend();
    backend.fail("search_metadata");
    let (state, notifier) = state(backend.clone());

    let mut lib = ExternalLibraryController::new(state);
    lib.load().await.unwrap();
    let game = lib.import("753640").await.unwrap();

    assert_eq!(game.title, "Outer Wilds");
    assert_eq!(game.library_app_id.as_deref(), Some("753640"));
    assert_eq!(backend.call_count("create_game"), 1);
    assert!(notifier.notices().iter().all(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn library_rejects_catalog_sort_keys() {
    let (state, _) = state(library_backend());
    let mut lib = ExternalLibraryController::new(state);
    lib.load().await.unwrap();

    assert_matches!(lib.select_sort(SortKey::Rating), Err(Error::InvalidInput(_)));
    lib.select_sort(SortKey::Name).unwrap();
    assert_eq!(lib.visible()[0].name, "Celeste");
}

#[tokio::test]
async fn import_drops_the_entry_from_the_not_collected_view() {
    let backend = library_backend();
    *backend.metadata.lock().unwrap() = vec![metadata(7, "Celeste")];
    let (state, _) = state(backend.clone());

    let mut lib = ExternalLibraryController::new(state);
    lib.load().await.unwrap();
    lib.set_collection(CollectionFilter::NotInCollection);
    assert_eq!(lib.visible().len(), 2);

    lib.import("504230").await.unwrap();
    let names: Vec<&str> = lib.visible().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Outer Wilds"]);
    assert_eq!(backend.call_count("library"), 1);
}

/// Two screens opened one after the other over the same preference store,
/// as two runs of the command line would be.
#[tokio::test]
async fn explicit_library_sort_survives_a_reopened_screen() {
    let notifier = Arc::new(RecordingNotifier::default());
    let prefs = Arc::new(MemoryPreferenceStore::default());
    let state = AppState::new(library_backend(), notifier, prefs);
    let ascending = SortSpec::new(SortKey::Playtime, SortDirection::Asc);

    let mut orders = Vec::new();
    for _ in 0..2 {
        let mut lib = ExternalLibraryController::new(state.clone());
        lib.load().await.unwrap();
        lib.set_sort(ascending).unwrap();
        orders.push(lib.visible().iter().map(|e| e.name.clone()).collect::<Vec<_>>());
    }
    assert_eq!(orders[0], ["Outer Wilds", "Celeste", "Hades"]);
    assert_eq!(orders[0], orders[1]);

    let mut lib = ExternalLibraryController::new(state);
    assert_eq!(lib.sort(), ascending);
    assert_matches!(
        lib.set_sort(SortSpec::new(SortKey::Status, SortDirection::Asc)),
        Err(Error::InvalidInput(_))
    );
    assert_eq!(lib.sort(), ascending);
}

#[tokio::test]
async fn library_view_mode_is_remembered() {
    let (state, _) = state(library_backend());

    let mut lib = ExternalLibraryController::new(state.clone());
    assert_eq!(lib.view_mode(), ViewMode::Grid);
    assert_eq!(lib.toggle_view_mode(), ViewMode::List);

    let reopened = ExternalLibraryController::new(state);
    assert_eq!(reopened.view_mode(), ViewMode::List);
}

#[tokio::test]
async fn library_stats_respect_the_cap() {
    let (state, _) = state(library_backend());
    let mut stats = ExternalStatsController::new(state);
    stats.load().await.unwrap();
    assert_eq!(stats.summary().included_count, 3);

    stats.set_cap(PlaytimeCap::Hours(20));
    let summary = stats.summary();
    assert_eq!(summary.included_count, 2);
    assert_eq!(summary.excluded[0].name, "Hades");
    assert_eq!(summary.played_count, 1);
    assert_eq!(summary.played_percentage, 33);
}
