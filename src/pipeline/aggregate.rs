// pipeline/aggregate.rs — Counts, percentages, groupings and top-N lists.
//
// Everything is recomputed from the filtered collection the caller passes in;
// nothing here is cached or persisted.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Game, GameStatus, LibraryEntry};

/// Length of the "top" and "recent" lists on the statistics screens.
pub const TOP_LIST_LEN: usize = 10;

/// `part / whole` as a whole percentage, rounded half up. Zero when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

// ---------------------------------------------------------------------------
// Generic groupings
// ---------------------------------------------------------------------------

/// One bucket of a grouping, e.g. `{ name: "PC", count: 4, percentage: 57 }`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CountShare {
    pub name:       String,
    pub count:      usize,
    pub percentage: u32,
}

/// Group by `key`, largest bucket first. Equal counts keep first-seen order.
/// Percentages are relative to the whole collection; records without a key
/// are not counted.
pub fn count_by<T, F>(items: &[T], key: F) -> Vec<CountShare>
where
    F: Fn(&T) -> Option<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        if let Some(k) = key(item) {
            let slot = counts.entry(k.clone()).or_insert(0);
            if *slot == 0 {
                order.push(k);
            }
            *slot += 1;
        }
    }

    let whole = items.len() as u64;
    let mut rows: Vec<CountShare> = order
        .into_iter()
        .map(|name| {
            let count = counts.get(&name).copied().unwrap_or(0);
            CountShare { percentage: percent(count as u64, whole), name, count }
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreOrder {
    #[default]
    Count,
    Playtime,
    Name,
}

/// A genre tag with how many records carry it and their summed playtime.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GenreShare {
    pub name:       String,
    pub count:      usize,
    pub playtime:   f64,
    /// Relative to the records that have at least one tag.
    pub percentage: u32,
}

/// Count every tag occurrence. Records with no tags are ignored entirely.
pub fn genre_breakdown<T, G, P>(items: &[T], tags: G, playtime: P, order: GenreOrder) -> Vec<GenreShare>
where
    G: Fn(&T) -> &[String],
    P: Fn(&T) -> f64,
{
    let mut rows: Vec<GenreShare> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tagged = 0u64;

    for item in items {
        let item_tags = tags(item);
        if item_tags.is_empty() {
            continue;
        }
        tagged += 1;
        let minutes = playtime(item);
        for tag in item_tags {
            let i = *index.entry(tag.clone()).or_insert_with(|| {
                rows.push(GenreShare { name: tag.clone(), count: 0, playtime: 0.0, percentage: 0 });
                rows.len() - 1
            });
            rows[i].count += 1;
            rows[i].playtime += minutes;
        }
    }

    for row in &mut rows {
        row.percentage = percent(row.count as u64, tagged);
    }
    order_genres(&mut rows, order);
    rows
}

pub fn order_genres(rows: &mut [GenreShare], order: GenreOrder) {
    match order {
        GenreOrder::Count => rows.sort_by(|a, b| b.count.cmp(&a.count)),
        GenreOrder::Playtime => {
            rows.sort_by(|a, b| b.playtime.partial_cmp(&a.playtime).unwrap_or(Ordering::Equal))
        }
        GenreOrder::Name => rows.sort_by(|a, b| crate::pipeline::sort::collate(&a.name, &b.name)),
    }
}

/// The `n` largest by `metric`, descending; ties keep input order.
pub fn top_n<T, F>(items: &[T], n: usize, metric: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut rows = items.to_vec();
    rows.sort_by(|a, b| metric(b).partial_cmp(&metric(a)).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Records whose metric is exactly zero, in input order.
pub fn never_touched<T, F>(items: &[T], metric: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    items.iter().filter(|item| metric(item) == 0.0).cloned().collect()
}

/// Records with a positive recency, most recent first.
pub fn recently_active<T, F>(items: &[T], recency: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> i64,
{
    let mut rows: Vec<T> = items.iter().filter(|item| recency(item) > 0).cloned().collect();
    rows.sort_by_key(|item| std::cmp::Reverse(recency(item)));
    rows
}

// ---------------------------------------------------------------------------
// Catalog summary
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CatalogSummary {
    pub total:           usize,
    /// Always all five statuses, in declaration order, zeros included.
    pub by_status:       Vec<CountShare>,
    pub by_platform:     Vec<CountShare>,
    pub by_genre:        Vec<GenreShare>,
    pub favorites:       usize,
    pub total_playtime:  f64,
    /// One decimal; `None` when nothing is rated.
    pub average_rating:  Option<f64>,
    pub completion_rate: u32,
}

impl CatalogSummary {
    pub fn count_for(&self, status: GameStatus) -> usize {
        self.by_status
            .iter()
            .find(|row| row.name == status.as_str())
            .map(|row| row.count)
            .unwrap_or(0)
    }
}

fn game_tags(game: &Game) -> &[String] {
    if game.genres.is_empty() {
        game.genre.as_slice()
    } else {
        &game.genres
    }
}

pub fn summarize(games: &[Game]) -> CatalogSummary {
    let total = games.len();
    let whole = total as u64;

    let by_status: Vec<CountShare> = GameStatus::ALL
        .iter()
        .map(|status| {
            let count = games.iter().filter(|g| g.status == *status).count();
            CountShare {
                name: status.as_str().to_string(),
                count,
                percentage: percent(count as u64, whole),
            }
        })
        .collect();

    let by_platform = count_by(games, |g| g.platform.map(|p| p.as_str().to_string()));
    let by_genre = genre_breakdown(games, game_tags, |g| g.playtime_hours, GenreOrder::Count);

    let ratings: Vec<i32> = games.iter().filter_map(|g| g.rating).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        let mean = ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    };

    let completed = games.iter().filter(|g| g.status == GameStatus::Completed).count();

    CatalogSummary {
        total,
        by_status,
        by_platform,
        by_genre,
        favorites: games.iter().filter(|g| g.favorite).count(),
        total_playtime: games.iter().map(|g| g.playtime_hours).sum(),
        average_rating,
        completion_rate: percent(completed as u64, whole),
    }
}

// ---------------------------------------------------------------------------
// Dashboard quick lists
// ---------------------------------------------------------------------------

pub const DASHBOARD_LIST_LEN: usize = 4;
pub const DASHBOARD_BACKLOG_LEN: usize = 6;

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct DashboardLists {
    pub in_progress:        Vec<Game>,
    pub recently_completed: Vec<Game>,
    pub favorites:          Vec<Game>,
    pub backlog:            Vec<Game>,
}

impl DashboardLists {
    pub fn build(games: &[Game]) -> Self {
        let by_status = |status: GameStatus, n: usize| -> Vec<Game> {
            games.iter().filter(|g| g.status == status).take(n).cloned().collect()
        };

        let mut completed: Vec<Game> = games
            .iter()
            .filter(|g| g.status == GameStatus::Completed)
            .cloned()
            .collect();
        // `None` sorts below every timestamp, so undated completions go last.
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed.truncate(DASHBOARD_LIST_LEN);

        Self {
            in_progress: by_status(GameStatus::InProgress, DASHBOARD_LIST_LEN),
            recently_completed: completed,
            favorites: games.iter().filter(|g| g.favorite).take(DASHBOARD_LIST_LEN).cloned().collect(),
            backlog: by_status(GameStatus::NotStarted, DASHBOARD_BACKLOG_LEN),
        }
    }

    /// Move a game out of the backlog and onto the front of in-progress.
    pub fn start_playing(&mut self, game: Game) {
        self.backlog.retain(|g| g.id != game.id);
        self.in_progress.retain(|g| g.id != game.id);
        self.in_progress.insert(0, game);
        self.in_progress.truncate(DASHBOARD_LIST_LEN);
    }
}

// ---------------------------------------------------------------------------
// External library statistics
// ---------------------------------------------------------------------------

/// Upper playtime bound for the library statistics. Games at or above the cap
/// are left out of every figure and listed separately.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaytimeCap {
    #[default]
    None,
    Hours(u32),
}

impl PlaytimeCap {
    pub const OPTIONS: [PlaytimeCap; 6] = [
        PlaytimeCap::None,
        PlaytimeCap::Hours(2000),
        PlaytimeCap::Hours(1000),
        PlaytimeCap::Hours(500),
        PlaytimeCap::Hours(200),
        PlaytimeCap::Hours(100),
    ];

    pub fn from_hours(hours: Option<u32>) -> Self {
        match hours {
            Some(h) if h > 0 => PlaytimeCap::Hours(h),
            _ => PlaytimeCap::None,
        }
    }

    pub fn limit_minutes(&self) -> Option<i64> {
        match self {
            PlaytimeCap::None => None,
            PlaytimeCap::Hours(h) => Some(*h as i64 * 60),
        }
    }

    pub fn admits(&self, entry: &LibraryEntry) -> bool {
        self.limit_minutes()
            .map_or(true, |limit| entry.playtime_forever < limit)
    }

    pub fn label(&self) -> String {
        match self {
            PlaytimeCap::None => "All games".to_string(),
            PlaytimeCap::Hours(h) => format!("Under {h}h"),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PlatformShare {
    pub platform:   &'static str,
    pub minutes:    i64,
    pub percentage: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct LibrarySummary {
    pub cap:                PlaytimeCap,
    pub included_count:     usize,
    /// Games at or above the cap, most played first.
    pub excluded:           Vec<LibraryEntry>,
    pub top_played:         Vec<LibraryEntry>,
    pub top_handheld:       Vec<LibraryEntry>,
    pub top_windows:        Vec<LibraryEntry>,
    pub recently_played:    Vec<LibraryEntry>,
    pub never_played:       Vec<LibraryEntry>,
    pub platform_split:     Vec<PlatformShare>,
    pub total_minutes:      i64,
    pub total_days:         i64,
    pub played_count:       usize,
    pub average_minutes:    i64,
    pub longest:            Option<LibraryEntry>,
    /// Played games under the cap relative to the whole, uncapped library.
    pub played_percentage:  u32,
}

/// `library_size` is the uncapped total the backend reports.
pub fn summarize_library(entries: &[LibraryEntry], cap: PlaytimeCap, library_size: usize) -> LibrarySummary {
    let (included, mut excluded): (Vec<LibraryEntry>, Vec<LibraryEntry>) =
        entries.iter().cloned().partition(|e| cap.admits(e));
    excluded.sort_by_key(|e| std::cmp::Reverse(e.playtime_forever));

    let played: Vec<LibraryEntry> = included.iter().filter(|e| e.is_played()).cloned().collect();
    let handheld: Vec<LibraryEntry> = included
        .iter()
        .filter(|e| e.playtime_handheld_forever > 0)
        .cloned()
        .collect();
    let windows: Vec<LibraryEntry> = included.iter().filter(|e| e.windows_minutes() > 0).cloned().collect();

    let top_played = top_n(&played, TOP_LIST_LEN, |e| e.playtime_forever as f64);
    let top_handheld = top_n(&handheld, TOP_LIST_LEN, |e| e.playtime_handheld_forever as f64);
    let top_windows = top_n(&windows, TOP_LIST_LEN, |e| e.windows_minutes() as f64);

    let mut recently_played = recently_active(&included, |e| e.rtime_last_played);
    recently_played.truncate(TOP_LIST_LEN);
    let mut never_played = never_touched(&included, |e| e.playtime_forever as f64);
    never_played.truncate(TOP_LIST_LEN);

    let total_minutes: i64 = included.iter().map(|e| e.playtime_forever).sum();
    let handheld_minutes: i64 = included.iter().map(|e| e.playtime_handheld_forever).sum();
    let windows_minutes = total_minutes - handheld_minutes;
    let split_base = total_minutes.max(1) as u64;
    let mut platform_split = vec![
        PlatformShare {
            platform: "Steam Deck",
            minutes: handheld_minutes,
            percentage: percent(handheld_minutes.max(0) as u64, split_base),
        },
        PlatformShare {
            platform: "Windows",
            minutes: windows_minutes,
            percentage: percent(windows_minutes.max(0) as u64, split_base),
        },
    ];
    platform_split.sort_by_key(|p| std::cmp::Reverse(p.minutes));

    let played_count = played.len();
    let average_minutes = if played_count == 0 {
        0
    } else {
        (total_minutes as f64 / played_count as f64).round() as i64
    };

    LibrarySummary {
        cap,
        included_count: included.len(),
        longest: top_played.first().cloned(),
        excluded,
        top_played,
        top_handheld,
        top_windows,
        recently_played,
        never_played,
        platform_split,
        total_minutes,
        total_days: total_minutes / 60 / 24,
        played_count,
        average_minutes,
        played_percentage: percent(played_count as u64, library_size as u64),
    }
}
