// models.rs — All data types exchanged with the backend.
//
// Wire JSON is camelCase; dates go through `crate::dates::wire` so both the
// ISO-string and the numeric-array encodings land as `NaiveDateTime`.
// Every field the backend may omit carries a serde default, so a sparse record
// still deserializes and the pipeline sees neutral values instead of errors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Null handling
// ---------------------------------------------------------------------------

/// Treat an explicit JSON `null` like a missing field.
///
/// `#[serde(default)]` only covers absent keys; the backend also sends `null`
/// for unset numbers, flags and lists. Use as
/// `#[serde(deserialize_with = "crate::models::null_as_default")]`.
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Tracks where the player is in their journey with a game.
/// Any status can be set at any time; there is no transition table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(from = "Option<String>", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Dropped,
}

impl GameStatus {
    pub const ALL: [GameStatus; 5] = [
        GameStatus::NotStarted,
        GameStatus::InProgress,
        GameStatus::Completed,
        GameStatus::OnHold,
        GameStatus::Dropped,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "NOT_STARTED",
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::Completed  => "COMPLETED",
            GameStatus::OnHold     => "ON_HOLD",
            GameStatus::Dropped    => "DROPPED",
        }
    }

    /// Lenient parse for data coming off the wire: unknown → NotStarted.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "Backlog",
            GameStatus::InProgress => "Playing",
            GameStatus::Completed  => "Completed",
            GameStatus::OnHold     => "On Hold",
            GameStatus::Dropped    => "Dropped",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "Haven't started yet",
            GameStatus::InProgress => "Currently playing",
            GameStatus::Completed  => "You've finished this game",
            GameStatus::OnHold     => "Taking a break from this one",
            GameStatus::Dropped    => "No longer playing",
        }
    }

    /// Position in the "status" sort order: in-progress first, dropped last.
    pub fn sort_rank(&self) -> usize {
        match self {
            GameStatus::InProgress => 0,
            GameStatus::NotStarted => 1,
            GameStatus::OnHold     => 2,
            GameStatus::Completed  => 3,
            GameStatus::Dropped    => 4,
        }
    }
}

impl From<Option<String>> for GameStatus {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(GameStatus::from_wire).unwrap_or_default()
    }
}

/// Strict parse for user input. Accepts `COMPLETED`, `completed`, `in-progress`.
impl FromStr for GameStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        GameStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown status '{s}'")))
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(from = "String", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePlatform {
    Pc,
    #[serde(rename = "PLAYSTATION_5")]
    Playstation5,
    #[serde(rename = "PLAYSTATION_4")]
    Playstation4,
    #[serde(rename = "PLAYSTATION_3")]
    Playstation3,
    XboxSeries,
    XboxOne,
    #[serde(rename = "XBOX_360")]
    Xbox360,
    NintendoSwitch,
    #[serde(rename = "NINTENDO_3DS")]
    Nintendo3ds,
    SteamDeck,
    MobileIos,
    MobileAndroid,
    Other,
}

impl GamePlatform {
    pub const ALL: [GamePlatform; 13] = [
        GamePlatform::Pc,
        GamePlatform::Playstation5,
        GamePlatform::Playstation4,
        GamePlatform::Playstation3,
        GamePlatform::XboxSeries,
        GamePlatform::XboxOne,
        GamePlatform::Xbox360,
        GamePlatform::NintendoSwitch,
        GamePlatform::Nintendo3ds,
        GamePlatform::SteamDeck,
        GamePlatform::MobileIos,
        GamePlatform::MobileAndroid,
        GamePlatform::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePlatform::Pc             => "PC",
            GamePlatform::Playstation5   => "PLAYSTATION_5",
            GamePlatform::Playstation4   => "PLAYSTATION_4",
            GamePlatform::Playstation3   => "PLAYSTATION_3",
            GamePlatform::XboxSeries     => "XBOX_SERIES",
            GamePlatform::XboxOne        => "XBOX_ONE",
            GamePlatform::Xbox360        => "XBOX_360",
            GamePlatform::NintendoSwitch => "NINTENDO_SWITCH",
            GamePlatform::Nintendo3ds    => "NINTENDO_3DS",
            GamePlatform::SteamDeck      => "STEAM_DECK",
            GamePlatform::MobileIos      => "MOBILE_IOS",
            GamePlatform::MobileAndroid  => "MOBILE_ANDROID",
            GamePlatform::Other          => "OTHER",
        }
    }

    /// Lenient parse: anything unrecognized is `Other`.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or(GamePlatform::Other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GamePlatform::Pc             => "PC",
            GamePlatform::Playstation5   => "PlayStation 5",
            GamePlatform::Playstation4   => "PlayStation 4",
            GamePlatform::Playstation3   => "PlayStation 3",
            GamePlatform::XboxSeries     => "Xbox Series X|S",
            GamePlatform::XboxOne        => "Xbox One",
            GamePlatform::Xbox360        => "Xbox 360",
            GamePlatform::NintendoSwitch => "Nintendo Switch",
            GamePlatform::Nintendo3ds    => "Nintendo 3DS",
            GamePlatform::SteamDeck      => "Steam Deck",
            GamePlatform::MobileIos      => "iOS",
            GamePlatform::MobileAndroid  => "Android",
            GamePlatform::Other          => "Other",
        }
    }
}

impl From<String> for GamePlatform {
    fn from(s: String) -> Self {
        GamePlatform::from_wire(&s)
    }
}

impl FromStr for GamePlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        GamePlatform::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown platform '{s}'")))
    }
}

impl fmt::Display for GamePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Core game record: the catalog entry
// ---------------------------------------------------------------------------

/// Full game record as the backend returns it.
/// RUST NOTE: `Option<T>` marks every field the backend is allowed to leave
/// out; `#[serde(default)]` on the struct fills the rest from `Default`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Game {
    pub id:                        Option<i64>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub title:                     String,
    pub description:               Option<String>,
    pub developer:                 Option<String>,
    pub publisher:                 Option<String>,
    pub release_year:              Option<i32>,
    #[serde(with = "crate::dates::wire")]
    pub release_date:              Option<NaiveDateTime>,
    pub genre:                     Option<String>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub genres:                    Vec<String>,
    pub cover_image_url:           Option<String>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub screenshot_urls:           Vec<String>,
    pub platform:                  Option<GamePlatform>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub platforms:                 Vec<GamePlatform>,
    pub status:                    GameStatus,
    pub rating:                    Option<i32>,     // 1 – 10
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_hours:            f64,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub completion_percentage:     i32,
    #[serde(with = "crate::dates::wire")]
    pub started_at:                Option<NaiveDateTime>,
    #[serde(with = "crate::dates::wire")]
    pub completed_at:              Option<NaiveDateTime>,
    pub notes:                     Option<String>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub favorite:                  bool,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub achievements:              i32,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub total_achievements:        i32,

    // metadata-service link
    #[serde(rename = "igdbId")]
    pub metadata_id:               Option<i64>,
    #[serde(rename = "igdbUrl")]
    pub metadata_url:              Option<String>,
    #[serde(rename = "igdbRating")]
    pub metadata_rating:           Option<f64>,
    #[serde(rename = "igdbRatingCount")]
    pub metadata_rating_count:     Option<i64>,

    // distribution-platform link
    #[serde(rename = "steamAppId")]
    pub library_app_id:            Option<String>,
    #[serde(rename = "steamPlaytimeWindowsMinutes")]
    pub library_windows_minutes:   Option<i64>,
    #[serde(rename = "steamPlaytimeLinuxMinutes")]
    pub library_linux_minutes:     Option<i64>,
    #[serde(rename = "steamPlaytimeMacMinutes")]
    pub library_mac_minutes:       Option<i64>,
    #[serde(rename = "steamPlaytimeDeckMinutes")]
    pub library_handheld_minutes:  Option<i64>,
    #[serde(rename = "steamLastPlayed", with = "crate::dates::wire")]
    pub library_last_played:       Option<NaiveDateTime>,
    #[serde(rename = "steamLastSynced", with = "crate::dates::wire")]
    pub library_last_synced:       Option<NaiveDateTime>,

    #[serde(with = "crate::dates::wire")]
    pub created_at:                Option<NaiveDateTime>,
    #[serde(with = "crate::dates::wire")]
    pub updated_at:                Option<NaiveDateTime>,
}

/// One row of the per-platform playtime breakdown on the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPlaytime {
    pub platform:   &'static str,
    pub minutes:    i64,
    pub hours:      f64,     // rounded to one decimal
    pub percentage: u32,
}

impl Game {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_library_data(&self) -> bool {
        self.library_app_id.is_some()
    }

    /// Windows + Linux + Mac minutes. Handheld time is reported by the
    /// platform as Linux time, so it is not added again.
    pub fn library_total_minutes(&self) -> i64 {
        self.library_windows_minutes.unwrap_or(0)
            + self.library_linux_minutes.unwrap_or(0)
            + self.library_mac_minutes.unwrap_or(0)
    }

    pub fn has_library_playtime(&self) -> bool {
        [
            self.library_windows_minutes,
            self.library_linux_minutes,
            self.library_mac_minutes,
            self.library_handheld_minutes,
        ]
        .iter()
        .any(|m| m.unwrap_or(0) > 0)
    }

    /// Windows and handheld rows, largest first. Percentages are of the
    /// total minutes (treated as 1 when zero).
    pub fn playtime_breakdown(&self) -> Vec<PlatformPlaytime> {
        let total = match self.library_total_minutes() {
            0 => 1,
            t => t,
        };
        let mut rows: Vec<PlatformPlaytime> = [
            ("Windows", self.library_windows_minutes),
            ("Steam Deck", self.library_handheld_minutes),
        ]
        .into_iter()
        .filter_map(|(platform, minutes)| {
            let minutes = minutes.filter(|m| *m > 0)?;
            Some(PlatformPlaytime {
                platform,
                minutes,
                hours: (minutes as f64 / 60.0 * 10.0).round() / 10.0,
                percentage: crate::pipeline::aggregate::percent(minutes as u64, total as u64),
            })
        })
        .collect();
        rows.sort_by(|a, b| b.minutes.cmp(&a.minutes));
        rows
    }

    pub fn achievement_progress(&self) -> u32 {
        if self.total_achievements <= 0 {
            return 0;
        }
        crate::pipeline::aggregate::percent(
            self.achievements.max(0) as u64,
            self.total_achievements as u64,
        )
    }
}

// ---------------------------------------------------------------------------
// Input struct, sent to the backend on create / update
// ---------------------------------------------------------------------------

/// Payload for creating or updating a game. No id, no timestamps.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    pub title:           String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description:     Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year:    Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre:           Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform:        Option<GamePlatform>,
    pub status:          GameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating:          Option<i32>,
    pub playtime_hours:  f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes:           Option<String>,
    pub favorite:        bool,
    #[serde(rename = "steamAppId", skip_serializing_if = "Option::is_none")]
    pub library_app_id:  Option<String>,
}

// ---------------------------------------------------------------------------
// External sources
// ---------------------------------------------------------------------------

/// A search result from the game-metadata service.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataGame {
    #[serde(rename = "igdbId")]
    pub metadata_id:      Option<i64>,
    pub name:             String,
    pub summary:          Option<String>,
    pub storyline:        Option<String>,
    pub cover_url:        Option<String>,
    #[serde(with = "crate::dates::wire")]
    pub release_date:     Option<NaiveDateTime>,
    pub release_year:     Option<i32>,
    pub developer:        Option<String>,
    pub publisher:        Option<String>,
    pub genres:           Vec<String>,
    pub platforms:        Vec<String>,
    pub rating:           Option<f64>,     // 0 – 100
    pub rating_count:     Option<i64>,
    pub aggregated_rating: Option<f64>,
    pub url:              Option<String>,
    pub screenshot_urls:  Vec<String>,
    #[serde(rename = "steamAppId")]
    pub library_app_id:   Option<String>,
}

/// Which curated list of the metadata service to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataFeed {
    Popular,
    Recent,
    Upcoming,
}

impl MetadataFeed {
    pub fn path(&self) -> &'static str {
        match self {
            MetadataFeed::Popular  => "popular",
            MetadataFeed::Recent   => "recent",
            MetadataFeed::Upcoming => "upcoming",
        }
    }
}

/// One owned game in the distribution-platform library. Minutes throughout.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryEntry {
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub app_id:                     String,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub name:                       String,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_forever:           i64,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_windows_forever:   i64,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_mac_forever:       i64,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_linux_forever:     i64,
    #[serde(rename = "playtimeDeckForever", deserialize_with = "crate::models::null_as_default")]
    pub playtime_handheld_forever:  i64,
    pub img_icon_url:               Option<String>,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub has_community_visible_stats: bool,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub rtime_last_played:          i64,     // unix seconds, 0 = never
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub playtime_disconnected:      i64,
    #[serde(deserialize_with = "crate::models::null_as_default")]
    pub genres:                     Vec<String>,
    /// Already present in the catalog (joined by app id).
    #[serde(rename = "inBacklog", deserialize_with = "crate::models::null_as_default")]
    pub in_collection:              bool,
    #[serde(rename = "backlogGameId")]
    pub catalog_game_id:            Option<i64>,
}

impl LibraryEntry {
    pub fn new(app_id: impl Into<String>, name: impl Into<String>, playtime_forever: i64) -> Self {
        Self {
            app_id: app_id.into(),
            name: name.into(),
            playtime_forever,
            ..Default::default()
        }
    }

    pub fn is_played(&self) -> bool {
        self.playtime_forever > 0
    }

    /// Minutes not spent on the handheld.
    pub fn windows_minutes(&self) -> i64 {
        self.playtime_forever - self.playtime_handheld_forever
    }

    pub fn last_played(&self) -> Option<NaiveDateTime> {
        crate::dates::from_unix(self.rtime_last_played)
    }

    pub fn icon_url(&self) -> Option<String> {
        self.img_icon_url.as_deref().filter(|h| !h.is_empty()).map(|hash| {
            format!(
                "https://media.steampowered.com/steamcommunity/public/images/apps/{}/{}.jpg",
                self.app_id, hash
            )
        })
    }

    pub fn header_url(&self) -> String {
        format!("https://steamcdn-a.akamaihd.net/steam/apps/{}/header.jpg", self.app_id)
    }

    pub fn store_url(&self) -> String {
        format!("https://store.steampowered.com/app/{}", self.app_id)
    }
}

/// Library-wide totals computed by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryStats {
    pub total_games:              i64,
    pub played_games:             i64,
    pub unplayed_games:           i64,
    pub total_playtime_minutes:   i64,
    pub total_playtime_hours:     f64,
    #[serde(rename = "deckPlaytimeMinutes")]
    pub handheld_playtime_minutes: i64,
    #[serde(rename = "deckPlaytimeHours")]
    pub handheld_playtime_hours:  f64,
    pub windows_playtime_minutes: i64,
    pub windows_playtime_hours:   f64,
    pub linux_playtime_minutes:   i64,
    pub linux_playtime_hours:     f64,
    pub played_percentage:        f64,
}

/// The distribution-platform account the library belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryProfile {
    #[serde(rename = "steamId")]
    pub account_id:                 String,
    pub persona_name:               String,
    pub profile_url:                String,
    pub avatar:                     String,
    pub avatar_medium:              String,
    pub avatar_full:                String,
    pub persona_state:              i32,
    pub community_visibility_state: i32,
    pub profile_state:              i32,
    pub last_logoff:                i64,
    pub real_name:                  Option<String>,
    pub country_code:               Option<String>,
    pub time_created:               i64,
}

impl LibraryProfile {
    pub fn persona_state_label(&self) -> &'static str {
        match self.persona_state {
            0 => "Offline",
            1 => "Online",
            2 => "Busy",
            3 => "Away",
            4 => "Snooze",
            5 => "Looking to trade",
            6 => "Looking to play",
            _ => "Unknown",
        }
    }

    pub fn is_public(&self) -> bool {
        self.community_visibility_state == 3
    }

    pub fn account_created(&self) -> Option<NaiveDateTime> {
        crate::dates::from_unix(self.time_created)
    }
}

// ---------------------------------------------------------------------------
// Stats / dashboard
// ---------------------------------------------------------------------------

/// The backend's own catalog summary (`GET /games/stats`).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerStats {
    pub total_games:        i64,
    pub completed_games:    i64,
    pub in_progress_games:  i64,
    pub not_started_games:  i64,
    pub on_hold_games:      i64,
    pub dropped_games:      i64,
    pub favorite_games:     i64,
    pub total_playtime:     f64,
    pub average_rating:     f64,
    pub completion_rate:    f64,
    pub platform_breakdown: BTreeMap<String, i64>,
    pub genre_breakdown:    BTreeMap<String, i64>,
}
