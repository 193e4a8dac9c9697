// pipeline/filter.rs — Conjunctive filtering.
//
// Each criterion is independent; a record survives only if every active
// criterion accepts it. Inactive criteria accept everything. When a criterion
// is active but the record type has no such field, the record is rejected.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Game, GamePlatform, GameStatus, LibraryEntry};

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayedFilter {
    #[default]
    All,
    Played,
    Unplayed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CollectionFilter {
    #[default]
    All,
    InCollection,
    NotInCollection,
}

/// The filter panel's state. `Default` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub term:           String,
    pub status:         Option<GameStatus>,
    pub platform:       Option<GamePlatform>,
    pub genre:          Option<String>,
    pub favorites_only: bool,
    pub played:         PlayedFilter,
    pub collection:     CollectionFilter,
    /// OR within the set, AND with everything else.
    pub genre_tags:     BTreeSet<String>,
}

impl FilterCriteria {
    pub fn has_active_filters(&self) -> bool {
        !self.term.trim().is_empty()
            || self.status.is_some()
            || self.platform.is_some()
            || self.genre.is_some()
            || self.favorites_only
            || self.played != PlayedFilter::All
            || self.collection != CollectionFilter::All
            || !self.genre_tags.is_empty()
    }

    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_genre_tag(&mut self, tag: &str) {
        if !self.genre_tags.remove(tag) {
            self.genre_tags.insert(tag.to_string());
        }
    }

    pub fn accepts<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        self.matches_term(record)
            && self.matches_status(record)
            && self.matches_platform(record)
            && self.matches_genre(record)
            && self.matches_favorite(record)
            && self.matches_played(record)
            && self.matches_collection(record)
            && self.matches_genre_tags(record)
    }

    fn matches_term<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        let term = self.term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_status<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match self.status {
            None => true,
            Some(wanted) => record.status() == Some(wanted),
        }
    }

    fn matches_platform<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match self.platform {
            None => true,
            Some(wanted) => record.platform() == Some(wanted),
        }
    }

    fn matches_genre<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match &self.genre {
            None => true,
            Some(wanted) => record.genre() == Some(wanted.as_str()),
        }
    }

    fn matches_favorite<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        !self.favorites_only || record.is_favorite() == Some(true)
    }

    fn matches_played<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match self.played {
            PlayedFilter::All => true,
            PlayedFilter::Played => record.is_played() == Some(true),
            PlayedFilter::Unplayed => record.is_played() == Some(false),
        }
    }

    fn matches_collection<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        match self.collection {
            CollectionFilter::All => true,
            CollectionFilter::InCollection => record.in_collection() == Some(true),
            CollectionFilter::NotInCollection => record.in_collection() == Some(false),
        }
    }

    fn matches_genre_tags<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        if self.genre_tags.is_empty() {
            return true;
        }
        record
            .genre_tags()
            .iter()
            .any(|tag| self.genre_tags.contains(tag))
    }
}

// ---------------------------------------------------------------------------
// What a record exposes to the filter
// ---------------------------------------------------------------------------

/// Field accessors the filter needs. `None` means the record type has no such
/// field, which makes an active criterion on it reject the record.
pub trait Filterable {
    /// Fields the free-text search looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn status(&self) -> Option<GameStatus> {
        None
    }
    fn platform(&self) -> Option<GamePlatform> {
        None
    }
    fn genre(&self) -> Option<&str> {
        None
    }
    fn is_favorite(&self) -> Option<bool> {
        None
    }
    fn is_played(&self) -> Option<bool> {
        None
    }
    fn in_collection(&self) -> Option<bool> {
        None
    }
    fn genre_tags(&self) -> &[String] {
        &[]
    }
}

impl Filterable for Game {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.developer.as_deref());
        fields.extend(self.genre.as_deref());
        fields
    }

    fn status(&self) -> Option<GameStatus> {
        Some(self.status)
    }
    fn platform(&self) -> Option<GamePlatform> {
        self.platform
    }
    fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }
    fn is_favorite(&self) -> Option<bool> {
        Some(self.favorite)
    }
    fn is_played(&self) -> Option<bool> {
        Some(self.playtime_hours > 0.0)
    }
    fn genre_tags(&self) -> &[String] {
        &self.genres
    }
}

impl Filterable for LibraryEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn is_played(&self) -> Option<bool> {
        Some(LibraryEntry::is_played(self))
    }
    fn in_collection(&self) -> Option<bool> {
        Some(self.in_collection)
    }
    fn genre_tags(&self) -> &[String] {
        &self.genres
    }
}

/// Order-preserving subsequence of `collection` accepted by `criteria`.
pub fn apply<T: Filterable + Clone>(collection: &[T], criteria: &FilterCriteria) -> Vec<T> {
    collection
        .iter()
        .filter(|record| criteria.accepts(*record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(title: &str, developer: Option<&str>, genre: Option<&str>) -> Game {
        Game {
            developer: developer.map(str::to_string),
            genre: genre.map(str::to_string),
            ..Game::new(title)
        }
    }

    #[test]
    fn test_default_criteria_match_everything() {
        let games = vec![game("A", None, None), game("B", Some("Dev"), Some("RPG"))];
        let criteria = FilterCriteria::default();
        assert!(!criteria.has_active_filters());
        assert_eq!(apply(&games, &criteria), games);
    }

    #[test]
    fn test_term_searches_title_developer_genre_case_insensitively() {
        let games = vec![
            game("Hollow Knight", Some("Team Cherry"), Some("Metroidvania")),
            game("Celeste", Some("Maddy Makes Games"), Some("Platformer")),
            game("Doom", Some("id Software"), Some("Shooter")),
        ];
        let mut criteria = FilterCriteria { term: "  CHERRY ".into(), ..Default::default() };
        assert_eq!(apply(&games, &criteria).len(), 1);

        criteria.term = "platform".into();
        assert_eq!(apply(&games, &criteria)[0].title, "Celeste");

        criteria.term = "   ".into();
        assert_eq!(apply(&games, &criteria).len(), 3);
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_library_search_is_name_only() {
        let mut entry = LibraryEntry::new("1", "Portal", 10);
        entry.genres = vec!["Puzzle".into()];
        let criteria = FilterCriteria { term: "puzzle".into(), ..Default::default() };
        assert!(apply(&[entry], &criteria).is_empty());
    }

    #[test]
    fn test_genre_tags_use_or_semantics() {
        let mut a = LibraryEntry::new("1", "A", 0);
        a.genres = vec!["Action".into()];
        let mut b = LibraryEntry::new("2", "B", 0);
        b.genres = vec!["RPG".into(), "Indie".into()];
        let c = LibraryEntry::new("3", "C", 0);

        let mut criteria = FilterCriteria::default();
        criteria.toggle_genre_tag("Action");
        criteria.toggle_genre_tag("Indie");
        let hits = apply(&[a, b, c], &criteria);
        assert_eq!(hits.iter().map(|e| e.app_id.as_str()).collect::<Vec<_>>(), ["1", "2"]);

        criteria.toggle_genre_tag("Action");
        assert!(!criteria.genre_tags.contains("Action"));
    }

    #[test]
    fn test_missing_field_fails_active_criterion() {
        let entry = LibraryEntry::new("1", "A", 5);
        let criteria = FilterCriteria { status: Some(GameStatus::Completed), ..Default::default() };
        assert!(apply(&[entry.clone()], &criteria).is_empty());

        let criteria = FilterCriteria { collection: CollectionFilter::InCollection, ..Default::default() };
        assert!(apply(&[Game::new("x")], &criteria).is_empty());

        let criteria = FilterCriteria { collection: CollectionFilter::NotInCollection, ..Default::default() };
        assert_eq!(apply(&[entry], &criteria).len(), 1);
    }

    #[test]
    fn test_played_and_favorites() {
        let played = LibraryEntry::new("1", "A", 1);
        let unplayed = LibraryEntry::new("2", "B", 0);
        let both = vec![played, unplayed];

        let criteria = FilterCriteria { played: PlayedFilter::Played, ..Default::default() };
        assert_eq!(apply(&both, &criteria)[0].app_id, "1");
        let criteria = FilterCriteria { played: PlayedFilter::Unplayed, ..Default::default() };
        assert_eq!(apply(&both, &criteria)[0].app_id, "2");

        let fav = Game { favorite: true, ..Game::new("Fav") };
        let criteria = FilterCriteria { favorites_only: true, ..Default::default() };
        assert_eq!(apply(&[Game::new("Plain"), fav], &criteria).len(), 1);
    }
}
