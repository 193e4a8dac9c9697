// cli/mod.rs — Wires the configured collaborators into the screen controllers
// and runs one command against them.

pub mod args;
mod render;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use chrono::Local;

use gameshelf_lib::api::HttpBackend;
use gameshelf_lib::config::AppConfig;
use gameshelf_lib::controllers::{
    AppState, CatalogController, DashboardController, DetailController, ExternalLibraryController,
    ExternalSearchController, ExternalStatsController, FormController, SearchTab,
};
use gameshelf_lib::models::{Game, GameStatus};
use gameshelf_lib::notify::TracingNotifier;
use gameshelf_lib::pipeline::aggregate::PlaytimeCap;
use gameshelf_lib::pipeline::sort::library_default_direction;
use gameshelf_lib::pipeline::{SortDirection, SortKey, SortSpec};
use gameshelf_lib::prefs::{MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};
use gameshelf_lib::{Error, Result};

use args::{Cli, Commands, FeedArg, LibraryArgs, ListArgs};

fn build_state(cli: &Cli, config: &AppConfig) -> AppState {
    let api_url = cli.api_url.as_deref().unwrap_or(&config.api_url);
    let backend = HttpBackend::new(api_url, config.timeout);

    let prefs: Arc<dyn PreferenceStore> = if cli.no_persist {
        Arc::new(MemoryPreferenceStore::default())
    } else {
        let path = config.preferences_path();
        match SqlitePreferenceStore::open(&path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preferences unavailable, using defaults");
                Arc::new(MemoryPreferenceStore::default())
            }
        }
    };

    AppState::new(Arc::new(backend), Arc::new(TracingNotifier), prefs)
}

fn confirm_delete(game: &Game) -> bool {
    print!("Delete \"{}\"? This cannot be undone. [y/N] ", game.title);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let state = build_state(&cli, &config);

    match cli.command {
        Commands::Dashboard => {
            let mut dashboard = DashboardController::new(state);
            dashboard.load().await?;
            println!("{}", render::dashboard(&dashboard));
        }

        Commands::List(args) => list(state, args).await?,

        Commands::Show { id } => {
            let mut detail = DetailController::new(state);
            if detail.load(id).await?.is_none() {
                return Err(Error::NotFound(format!("game {id}")));
            }
            print_detail(&detail);
        }

        Commands::Add(fields) => {
            let mut form = FormController::new(state);
            fields.apply(&mut form.form)?;
            let id = form.submit().await?;
            println!("Created game #{id}");
        }

        Commands::Edit { id, fields } => {
            let mut form = FormController::edit(state, id).await?;
            fields.apply(&mut form.form)?;
            form.submit().await?;
            println!("Updated game #{id}");
        }

        Commands::Delete { id, yes } => {
            let mut detail = DetailController::new(state);
            if detail.load(id).await?.is_none() {
                return Err(Error::NotFound(format!("game {id}")));
            }
            let deleted = detail.delete(|game| yes || confirm_delete(game)).await?;
            if !deleted {
                println!("Cancelled.");
            }
        }

        Commands::Favorite { id } => {
            let mut detail = load_detail(state, id).await?;
            detail.toggle_favorite().await?;
            let favorite = detail.game().is_some_and(|g| g.favorite);
            println!("{}", if favorite { "Added to favorites" } else { "Removed from favorites" });
        }

        Commands::Status { id, status } => {
            let status: GameStatus = status.parse()?;
            let mut detail = load_detail(state, id).await?;
            detail.update_status(status).await?;
        }

        Commands::Start { id } => {
            let mut dashboard = DashboardController::new(state);
            dashboard.load().await?;
            dashboard.start_playing(id).await?;
            println!("{}", render::dashboard(&dashboard));
        }

        Commands::Sync { id } => {
            let mut detail = load_detail(state, id).await?;
            detail.sync_library_data().await?;
            print_detail(&detail);
        }

        Commands::Refresh { id } => {
            let mut detail = load_detail(state, id).await?;
            detail.refresh_from_metadata().await?;
            print_detail(&detail);
        }

        Commands::Search { query, tab } => {
            let mut search = ExternalSearchController::new(state);
            search.load().await?;
            let tab = match (tab, query.as_deref()) {
                (Some(FeedArg::Popular), _) => SearchTab::Popular,
                (Some(FeedArg::Recent), _) => SearchTab::Recent,
                (Some(FeedArg::Upcoming), _) => SearchTab::Upcoming,
                (None, Some(_)) => SearchTab::Search,
                (None, None) => SearchTab::Popular,
            };
            search.select_tab(tab).await?;
            if let (SearchTab::Search, Some(q)) = (tab, query.as_deref()) {
                search.search(q).await?;
            }
            println!("{}\n", tab.label());
            println!(
                "{}",
                render::metadata_results(search.active_results(), |id| search.is_in_catalog(id))
            );
        }

        Commands::Import { metadata_id } => {
            let mut search = ExternalSearchController::new(state);
            search.load().await?;
            match search.import(metadata_id).await? {
                Some(game) => println!("Imported \"{}\"", game.title),
                None => println!("Already in your library"),
            }
        }

        Commands::Library(args) => library(state, args).await?,

        Commands::LibraryImport { app_id } => {
            let mut lib = ExternalLibraryController::new(state);
            lib.load().await?;
            let game = lib.import(&app_id).await?;
            if let Some(id) = game.id {
                println!("Saved as game #{id}");
            }
        }

        Commands::LibraryStats { cap_hours } => {
            let mut stats = ExternalStatsController::new(state);
            stats.load().await?;
            stats.set_cap(PlaytimeCap::from_hours(cap_hours));
            println!("{}", render::library_stats(&stats, Local::now().naive_local()));
        }
    }
    Ok(())
}

async fn load_detail(state: AppState, id: i64) -> Result<DetailController> {
    let mut detail = DetailController::new(state);
    if detail.load(id).await?.is_none() {
        return Err(Error::NotFound(format!("game {id}")));
    }
    Ok(detail)
}

fn print_detail(detail: &DetailController) {
    if let Some(game) = detail.game() {
        println!(
            "{}",
            render::game_detail(game, detail.achievement_progress(), &detail.playtime_breakdown())
        );
    }
}

async fn list(state: AppState, args: ListArgs) -> Result<()> {
    let mut catalog = CatalogController::new(state);
    catalog.load().await?;

    if args.toggle_view {
        catalog.toggle_view_mode();
    }
    if let Some(size) = args.page_size {
        catalog.set_page_size(size)?;
    }
    if let Some(key) = args.sort.as_deref() {
        let key: SortKey = key.parse()?;
        if !SortKey::CATALOG.contains(&key) {
            return Err(Error::InvalidInput(format!("cannot sort the catalog by {key}")));
        }
        let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
        catalog.set_sort(SortSpec::new(key, direction));
    } else if args.desc {
        let current = catalog.preferences().sort;
        catalog.set_sort(SortSpec::new(current.key, SortDirection::Desc));
    }

    if let Some(term) = args.search {
        catalog.set_search(term);
    }
    if let Some(status) = args.status.as_deref() {
        catalog.set_status(Some(status.parse()?));
    }
    if let Some(platform) = args.platform.as_deref() {
        catalog.set_platform(Some(platform.parse()?));
    }
    if args.genre.is_some() {
        catalog.set_genre(args.genre);
    }
    if args.favorites {
        catalog.set_favorites_only(true);
    }
    catalog.go_to_page(args.page.saturating_sub(1));

    println!("{}", render::game_list(&catalog, args.stats));
    Ok(())
}

/// Explicit flags win; otherwise the key's natural direction.
fn library_direction(key: SortKey, asc: bool, desc: bool) -> SortDirection {
    if desc {
        SortDirection::Desc
    } else if asc {
        SortDirection::Asc
    } else {
        library_default_direction(key)
    }
}

async fn library(state: AppState, args: LibraryArgs) -> Result<()> {
    let mut lib = ExternalLibraryController::new(state);
    lib.load().await?;

    if let Some(term) = args.search {
        lib.set_search(term);
    }
    lib.set_played(args.played.into());
    lib.set_collection(args.collection.into());
    for tag in &args.genres {
        lib.toggle_genre(tag);
    }
    if args.toggle_view {
        lib.toggle_view_mode();
    }
    if let Some(key) = args.sort.as_deref() {
        let key: SortKey = key.parse()?;
        lib.set_sort(SortSpec::new(key, library_direction(key, args.asc, args.desc)))?;
    } else if args.asc || args.desc {
        let current = lib.sort();
        lib.set_sort(SortSpec::new(current.key, library_direction(current.key, args.asc, args.desc)))?;
    }

    if args.genre_stats {
        lib.set_genre_order(args.genre_order.into());
        println!("{}", render::genre_stats(lib.genres()));
        return Ok(());
    }

    lib.go_to_page(args.page.saturating_sub(1));
    println!("{}", render::library(&lib, Local::now().naive_local()));
    Ok(())
}
