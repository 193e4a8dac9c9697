// cli/render.rs — Plain-text views of the controllers' state.

use chrono::NaiveDateTime;

use gameshelf_lib::controllers::{
    CatalogController, DashboardController, ExternalLibraryController, ExternalStatsController,
};
use gameshelf_lib::format::{
    format_date, format_datetime, format_hours, format_hours_long, format_last_played, format_minutes,
    format_minutes_stat, format_rating, thousands,
};
use gameshelf_lib::models::{Game, MetadataGame, PlatformPlaytime};
use gameshelf_lib::pipeline::aggregate::{CatalogSummary, GenreShare};
use gameshelf_lib::pipeline::paginate::{Page, PageMarker};
use gameshelf_lib::prefs::ViewMode;

fn game_line(game: &Game) -> String {
    let star = if game.favorite { "★" } else { " " };
    let id = game.id.map(|i| format!("#{i}")).unwrap_or_else(|| "#-".to_string());
    let platform = game.platform.map(|p| p.label()).unwrap_or("—");
    let rating = game.rating.map(|r| format!("{r}/10")).unwrap_or_default();
    format!(
        "{star} {id:>5}  {:<40}  {:<10}  {:<16}  {:>6}  {}",
        truncate(&game.title, 40),
        game.status.label(),
        platform,
        format_hours(game.playtime_hours),
        rating
    )
}

fn game_card(game: &Game) -> String {
    let star = if game.favorite { " ★" } else { "" };
    let id = game.id.map(|i| format!("#{i} ")).unwrap_or_default();
    let mut meta: Vec<String> = vec![game.status.label().to_string()];
    meta.extend(game.platform.map(|p| p.label().to_string()));
    meta.extend(game.release_year.map(|y| y.to_string()));
    format!("[{id}{}{star}]\n    {}", game.title, meta.join(" · "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn page_bar<T>(page: &Page<'_, T>) -> String {
    let current = page.current_page();
    let markers: Vec<String> = page
        .markers()
        .into_iter()
        .map(|m| match m {
            PageMarker::Page(n) if n == current => format!("[{n}]"),
            PageMarker::Page(n) => n.to_string(),
            PageMarker::Ellipsis => "…".to_string(),
        })
        .collect();
    format!("{}   {}", markers.join(" "), page.range_label())
}

fn summary_lines(summary: &CatalogSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} games · {} favorites · {} played · avg rating {} · {}% completed",
        summary.total,
        summary.favorites,
        format_hours(summary.total_playtime),
        summary.average_rating.map(|r| format!("{r:.1}")).unwrap_or_else(|| "—".into()),
        summary.completion_rate
    )];
    let statuses: Vec<String> = summary
        .by_status
        .iter()
        .map(|s| format!("{} {} ({}%)", s.name, s.count, s.percentage))
        .collect();
    lines.push(format!("  status:    {}", statuses.join(", ")));
    if !summary.by_platform.is_empty() {
        let platforms: Vec<String> = summary
            .by_platform
            .iter()
            .map(|s| format!("{} {} ({}%)", s.name, s.count, s.percentage))
            .collect();
        lines.push(format!("  platforms: {}", platforms.join(", ")));
    }
    if !summary.by_genre.is_empty() {
        let genres: Vec<String> = summary
            .by_genre
            .iter()
            .take(8)
            .map(|g| format!("{} {} ({}%)", g.name, g.count, g.percentage))
            .collect();
        lines.push(format!("  genres:    {}", genres.join(", ")));
    }
    lines
}

pub fn dashboard(controller: &DashboardController) -> String {
    let stats = controller.server_stats();
    let lists = controller.lists();
    let mut lines = vec![
        format!(
            "Games {}   Playing {}   Completed {}   Backlog {}   Playtime {}   Completion {:.0}%",
            stats.total_games,
            stats.in_progress_games,
            stats.completed_games,
            stats.not_started_games,
            format_hours(stats.total_playtime),
            stats.completion_rate
        ),
        String::new(),
    ];

    let sections: [(&str, &[Game]); 4] = [
        ("Currently playing", lists.in_progress.as_slice()),
        ("Recently completed", lists.recently_completed.as_slice()),
        ("Favorites", lists.favorites.as_slice()),
        ("Up next", lists.backlog.as_slice()),
    ];
    for (title, games) in sections {
        lines.push(format!("{title}:"));
        if games.is_empty() {
            lines.push("  (none)".to_string());
        }
        lines.extend(games.iter().map(game_line));
        lines.push(String::new());
    }
    lines.extend(summary_lines(controller.summary()));
    lines.join("\n")
}

pub fn game_list(controller: &CatalogController, with_stats: bool) -> String {
    let page = controller.page();
    let prefs = controller.preferences();
    let mut lines = vec![format!(
        "Sorted by {} {}{}",
        prefs.sort.key.label(),
        prefs.sort.direction.arrow(),
        if controller.has_active_filters() { "   (filtered)" } else { "" }
    )];

    if page.items.is_empty() {
        lines.push(if controller.has_active_filters() {
            "No games match your filters.".to_string()
        } else {
            "Your collection is empty.".to_string()
        });
    }
    match prefs.view_mode {
        ViewMode::List => lines.extend(page.items.iter().map(game_line)),
        ViewMode::Grid => lines.extend(page.items.iter().map(game_card)),
    }
    lines.push(page_bar(&page));

    if with_stats {
        lines.push(String::new());
        lines.extend(summary_lines(controller.summary()));
    }
    lines.join("\n")
}

pub fn game_detail(game: &Game, achievement_progress: u32, breakdown: &[PlatformPlaytime]) -> String {
    let mut lines = vec![game_card(game)];
    let field = |label: &str, value: Option<String>| value.map(|v| format!("  {label:<14}{v}"));

    lines.extend(
        [
            field("Developer", game.developer.clone()),
            field("Publisher", game.publisher.clone()),
            field("Genre", game.genre.clone()),
            field("Genres", (!game.genres.is_empty()).then(|| game.genres.join(", "))),
            field("Rating", game.rating.map(|r| format!("{r}/10"))),
            field("Playtime", Some(format_hours_long(game.playtime_hours))),
            field("Released", game.release_date.map(|d| format_date(Some(d)))),
            field("Started", game.started_at.map(|d| format_date(Some(d)))),
            field("Completed", game.completed_at.map(|d| format_date(Some(d)))),
            field("IGDB rating", game.metadata_rating.map(|r| format_rating(Some(r)))),
            field("Added", game.created_at.map(|d| format_datetime(Some(d)))),
        ]
        .into_iter()
        .flatten(),
    );

    if game.total_achievements > 0 {
        lines.push(format!(
            "  Achievements  {}/{} ({}%)",
            game.achievements, game.total_achievements, achievement_progress
        ));
    }

    if game.has_library_data() {
        lines.push(format!(
            "  Steam         {} total{}",
            format_minutes(game.library_total_minutes()),
            game.library_last_synced
                .map(|d| format!(", synced {}", format_datetime(Some(d))))
                .unwrap_or_default()
        ));
        for row in breakdown {
            lines.push(format!("    {:<12}{:>7.1}h  {:>3}%", row.platform, row.hours, row.percentage));
        }
    }

    if let Some(notes) = game.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(String::new());
        lines.push(notes.to_string());
    }
    lines.join("\n")
}

pub fn metadata_results(results: &[MetadataGame], in_catalog: impl Fn(i64) -> bool) -> String {
    if results.is_empty() {
        return "No results.".to_string();
    }
    results
        .iter()
        .map(|g| {
            let id = g.metadata_id.map(|i| i.to_string()).unwrap_or_else(|| "-".into());
            let added = g.metadata_id.is_some_and(&in_catalog);
            format!(
                "{:>8}  {:<44} {:>6}  {:>4}  {}",
                id,
                truncate(&g.name, 44),
                g.release_year.map(|y| y.to_string()).unwrap_or_default(),
                format_rating(g.rating),
                if added { "✓ in library" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn library(controller: &ExternalLibraryController, now: NaiveDateTime) -> String {
    let page = controller.page();
    let sort = controller.sort();
    let mut lines = vec![format!(
        "{} games · {} played · {} unplayed · {} in collection   sorted by {} {}",
        controller.entries().len(),
        controller.played_count(),
        controller.unplayed_count(),
        controller.in_collection_count(),
        sort.key.label(),
        sort.direction.arrow()
    )];
    for entry in page.items {
        lines.push(format!(
            "{:>9}  {:<44} {:>12}  {:<14} {}",
            entry.app_id,
            truncate(&entry.name, 44),
            format_minutes(entry.playtime_forever),
            format_last_played(entry.rtime_last_played, now),
            if entry.in_collection { "✓" } else { "" }
        ));
    }
    lines.push(page_bar(&page));
    lines.join("\n")
}

pub fn genre_stats(genres: &[GenreShare]) -> String {
    if genres.is_empty() {
        return "No genre data yet.".to_string();
    }
    genres
        .iter()
        .map(|g| {
            format!(
                "{:<24} {:>5} games  {:>3}%  {:>10}",
                g.name,
                g.count,
                g.percentage,
                format_minutes_stat(g.playtime as i64)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn library_stats(controller: &ExternalStatsController, now: NaiveDateTime) -> String {
    let summary = controller.summary();
    let mut lines = Vec::new();

    if let Some(profile) = controller.profile() {
        lines.push(format!("{} ({})", profile.persona_name, profile.persona_state_label()));
    }
    lines.push(format!(
        "{}: {} games · {} played ({}%) · {} days · avg {} per played game",
        summary.cap.label(),
        thousands(summary.included_count as i64),
        thousands(summary.played_count as i64),
        summary.played_percentage,
        thousands(summary.total_days),
        format_minutes_stat(summary.average_minutes)
    ));
    if let Some(longest) = &summary.longest {
        lines.push(format!("Most played: {} ({})", longest.name, format_minutes_stat(longest.playtime_forever)));
    }
    for share in &summary.platform_split {
        lines.push(format!(
            "  {:<12}{:>10}  {:>3}%",
            share.platform,
            format_minutes_stat(share.minutes),
            share.percentage
        ));
    }

    let sections = [
        ("Top played", &summary.top_played),
        ("Top on Steam Deck", &summary.top_handheld),
        ("Top on Windows", &summary.top_windows),
        ("Recently played", &summary.recently_played),
        ("Never played", &summary.never_played),
        ("Over the cap", &summary.excluded),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{title}:"));
        for entry in entries.iter() {
            lines.push(format!(
                "  {:<44} {:>10}  {}",
                truncate(&entry.name, 44),
                format_minutes_stat(entry.playtime_forever),
                format_last_played(entry.rtime_last_played, now)
            ));
        }
    }
    lines.join("\n")
}
