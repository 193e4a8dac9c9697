// pipeline/sort.rs — Stable ordering by a selectable key and direction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Error;
use crate::models::{Game, LibraryEntry};

// ---------------------------------------------------------------------------
// Key / direction / spec
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Title,
    ReleaseYear,
    Rating,
    Playtime,
    Status,
    DateAdded,
    Name,
    Recent,
}

impl SortKey {
    pub const CATALOG: [SortKey; 6] = [
        SortKey::Title,
        SortKey::ReleaseYear,
        SortKey::Rating,
        SortKey::Playtime,
        SortKey::Status,
        SortKey::DateAdded,
    ];

    pub const LIBRARY: [SortKey; 3] = [SortKey::Name, SortKey::Playtime, SortKey::Recent];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title       => "title",
            SortKey::ReleaseYear => "releaseYear",
            SortKey::Rating      => "rating",
            SortKey::Playtime    => "playtime",
            SortKey::Status      => "status",
            SortKey::DateAdded   => "dateAdded",
            SortKey::Name        => "name",
            SortKey::Recent      => "recent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Title       => "Title",
            SortKey::ReleaseYear => "Release Year",
            SortKey::Rating      => "Rating",
            SortKey::Playtime    => "Playtime",
            SortKey::Status      => "Status",
            SortKey::DateAdded   => "Date Added",
            SortKey::Name        => "Name",
            SortKey::Recent      => "Recently Played",
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    /// Accepts the wire name (`releaseYear`) or a dashed form (`release-year`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        [SortKey::CATALOG.as_slice(), SortKey::LIBRARY.as_slice()]
            .concat()
            .into_iter()
            .find(|k| k.as_str().to_lowercase() == folded)
            .ok_or_else(|| Error::InvalidInput(format!("unknown sort key '{s}'")))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(Error::InvalidInput(format!("unknown sort direction '{s}'"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key:       SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Same key toggles the direction; a different key starts at that key's
    /// default direction for the screen.
    pub fn select(&mut self, key: SortKey, default_direction: impl Fn(SortKey) -> SortDirection) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = default_direction(key);
        }
    }
}

/// The catalog list starts every key ascending.
pub fn catalog_default_direction(_key: SortKey) -> SortDirection {
    SortDirection::Asc
}

/// The external library starts names ascending, numbers descending.
pub fn library_default_direction(key: SortKey) -> SortDirection {
    match key {
        SortKey::Name | SortKey::Title => SortDirection::Asc,
        _ => SortDirection::Desc,
    }
}

// ---------------------------------------------------------------------------
// Comparable values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => collate(a, b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

/// Accent- and case-insensitive primary order. Ties fall back to the accented
/// form, then lowercase sorts before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| swap_case(a).cmp(&swap_case(b)))
}

/// Decompose, drop combining marks, lowercase: "Éalú" -> "ealu".
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn swap_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        })
        .collect()
}

fn timestamp(dt: Option<NaiveDateTime>) -> f64 {
    dt.map(|d| d.and_utc().timestamp_millis() as f64).unwrap_or(0.0)
}

/// Missing numbers are 0, missing text is "". A record with no status gets
/// rank -1 so it sorts ahead of every real status.
pub trait Sortable {
    fn sort_value(&self, key: SortKey) -> SortValue<'_>;
}

impl Sortable for Game {
    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        match key {
            SortKey::Title | SortKey::Name => SortValue::Text(&self.title),
            SortKey::ReleaseYear => SortValue::Number(self.release_year.unwrap_or(0) as f64),
            SortKey::Rating      => SortValue::Number(self.rating.unwrap_or(0) as f64),
            SortKey::Playtime    => SortValue::Number(self.playtime_hours),
            SortKey::Status      => SortValue::Number(self.status.sort_rank() as f64),
            SortKey::DateAdded   => SortValue::Number(timestamp(self.created_at)),
            SortKey::Recent      => SortValue::Number(timestamp(self.library_last_played)),
        }
    }
}

impl Sortable for LibraryEntry {
    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        match key {
            SortKey::Title | SortKey::Name => SortValue::Text(&self.name),
            SortKey::Playtime => SortValue::Number(self.playtime_forever as f64),
            SortKey::Recent   => SortValue::Number(self.rtime_last_played as f64),
            SortKey::Status   => SortValue::Number(-1.0),
            SortKey::ReleaseYear | SortKey::Rating | SortKey::DateAdded => SortValue::Number(0.0),
        }
    }
}

pub fn compare<T: Sortable + ?Sized>(a: &T, b: &T, spec: &SortSpec) -> Ordering {
    let ord = a.sort_value(spec.key).compare(&b.sort_value(spec.key));
    match spec.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// `slice::sort_by` is stable, so ties keep their input order in both directions.
pub fn sort_in_place<T: Sortable>(rows: &mut [T], spec: &SortSpec) {
    rows.sort_by(|a, b| compare(a, b, spec));
}

pub fn apply<T: Sortable + Clone>(collection: &[T], spec: &SortSpec) -> Vec<T> {
    let mut rows = collection.to_vec();
    sort_in_place(&mut rows, spec);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameStatus;

    fn titles(games: &[Game]) -> Vec<&str> {
        games.iter().map(|g| g.title.as_str()).collect()
    }

    #[test]
    fn test_collation_is_case_insensitive_lowercase_first() {
        let games = vec![Game::new("banana"), Game::new("Apple"), Game::new("apple"), Game::new("Cherry")];
        let sorted = apply(&games, &SortSpec::new(SortKey::Title, SortDirection::Asc));
        assert_eq!(titles(&sorted), ["apple", "Apple", "banana", "Cherry"]);
    }

    #[test]
    fn test_accented_titles_sort_with_their_base_letter() {
        let games = vec![Game::new("Zelda"), Game::new("Éalú"), Game::new("Elden Ring")];
        let sorted = apply(&games, &SortSpec::new(SortKey::Title, SortDirection::Asc));
        assert_eq!(titles(&sorted), ["Éalú", "Elden Ring", "Zelda"]);

        assert_eq!(collate("ealu", "Éalú"), Ordering::Less);
        assert_eq!(collate("éalú", "Éalú"), Ordering::Less);
    }

    #[test]
    fn test_missing_numbers_sort_as_zero() {
        let rated = Game { rating: Some(3), ..Game::new("rated") };
        let unrated = Game::new("unrated");
        let sorted = apply(&[rated, unrated], &SortSpec::new(SortKey::Rating, SortDirection::Asc));
        assert_eq!(titles(&sorted), ["unrated", "rated"]);
    }

    #[test]
    fn test_status_rank_order() {
        let games: Vec<Game> = [
            GameStatus::Dropped,
            GameStatus::Completed,
            GameStatus::NotStarted,
            GameStatus::OnHold,
            GameStatus::InProgress,
        ]
        .into_iter()
        .map(|status| Game { status, ..Game::new(status.as_str()) })
        .collect();
        let sorted = apply(&games, &SortSpec::new(SortKey::Status, SortDirection::Asc));
        assert_eq!(
            titles(&sorted),
            ["IN_PROGRESS", "NOT_STARTED", "ON_HOLD", "COMPLETED", "DROPPED"]
        );
    }

    #[test]
    fn test_descending_keeps_ties_stable() {
        let games = vec![
            Game { playtime_hours: 5.0, ..Game::new("a") },
            Game { playtime_hours: 9.0, ..Game::new("b") },
            Game { playtime_hours: 5.0, ..Game::new("c") },
        ];
        let sorted = apply(&games, &SortSpec::new(SortKey::Playtime, SortDirection::Desc));
        assert_eq!(titles(&sorted), ["b", "a", "c"]);
    }

    #[test]
    fn test_select_toggles_or_resets() {
        let mut spec = SortSpec::new(SortKey::Playtime, SortDirection::Desc);
        spec.select(SortKey::Playtime, library_default_direction);
        assert_eq!(spec.direction, SortDirection::Asc);

        spec.select(SortKey::Name, library_default_direction);
        assert_eq!(spec, SortSpec::new(SortKey::Name, SortDirection::Asc));

        spec.select(SortKey::Recent, library_default_direction);
        assert_eq!(spec.direction, SortDirection::Desc);

        spec.select(SortKey::Rating, catalog_default_direction);
        assert_eq!(spec.direction, SortDirection::Asc);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("release-year".parse::<SortKey>().unwrap(), SortKey::ReleaseYear);
        assert_eq!("dateAdded".parse::<SortKey>().unwrap(), SortKey::DateAdded);
        assert!("color".parse::<SortKey>().is_err());
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    }
}
