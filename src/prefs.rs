// prefs.rs — Per-screen view preferences and where they are stored.
//
// Only view mode, sort key/direction and page size survive a restart. Each
// screen owns one JSON blob:
//
//   { "viewMode": "grid", "sortKey": "title", "sortDirection": "asc", "pageSize": 12 }
//
// The blob is merged over the screen's defaults one field at a time, so a
// missing or invalid field never discards the valid ones.
//
// The SQLite store uses `rusqlite`, a thin synchronous wrapper around SQLite.
// Every call locks the connection, runs one statement and releases the lock.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::pipeline::paginate::{CATALOG_PAGE_SIZES, DEFAULT_CATALOG_PAGE_SIZE, LIBRARY_PAGE_SIZE};
use crate::pipeline::sort::{SortDirection, SortKey, SortSpec};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPreferences {
    pub view_mode: ViewMode,
    pub sort:      SortSpec,
    pub page_size: usize,
}

/// A screen that persists preferences. The key names its blob in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Catalog,
    Library,
}

impl Screen {
    pub fn key(&self) -> &'static str {
        match self {
            Screen::Catalog => "gamesList",
            Screen::Library => "steamLibrary",
        }
    }

    pub fn defaults(&self) -> ViewPreferences {
        match self {
            Screen::Catalog => ViewPreferences {
                view_mode: ViewMode::Grid,
                sort: SortSpec::new(SortKey::Title, SortDirection::Asc),
                page_size: DEFAULT_CATALOG_PAGE_SIZE,
            },
            Screen::Library => ViewPreferences {
                view_mode: ViewMode::Grid,
                sort: SortSpec::new(SortKey::Playtime, SortDirection::Desc),
                page_size: LIBRARY_PAGE_SIZE,
            },
        }
    }

    fn sort_keys(&self) -> &'static [SortKey] {
        match self {
            Screen::Catalog => &SortKey::CATALOG,
            Screen::Library => &SortKey::LIBRARY,
        }
    }

    fn page_sizes(&self) -> &'static [usize] {
        match self {
            Screen::Catalog => &CATALOG_PAGE_SIZES,
            Screen::Library => &[LIBRARY_PAGE_SIZE],
        }
    }
}

impl ViewPreferences {
    /// Merge a stored blob over `screen`'s defaults.
    pub fn from_blob(screen: Screen, blob: &str) -> Self {
        let mut prefs = screen.defaults();
        let fields: Map<String, Value> = match serde_json::from_str(blob) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::debug!(screen = screen.key(), "stored preferences unreadable, using defaults");
                return prefs;
            }
        };

        if let Some(mode) = fields.get("viewMode").and_then(Value::as_str).and_then(ViewMode::parse) {
            prefs.view_mode = mode;
        }
        if let Some(key) = fields
            .get("sortKey")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<SortKey>().ok())
            .filter(|k| screen.sort_keys().contains(k))
        {
            prefs.sort.key = key;
        }
        if let Some(direction) = fields
            .get("sortDirection")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<SortDirection>().ok())
        {
            prefs.sort.direction = direction;
        }
        if let Some(size) = fields
            .get("pageSize")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .filter(|n| screen.page_sizes().contains(n))
        {
            prefs.page_size = size;
        }
        prefs
    }

    pub fn to_blob(&self) -> String {
        json!({
            "viewMode": self.view_mode.as_str(),
            "sortKey": self.sort.key.as_str(),
            "sortDirection": match self.sort.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            },
            "pageSize": self.page_size,
        })
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}

/// Read a screen's preferences. Storage failures are logged and the
/// defaults returned.
pub fn load_preferences(store: &dyn PreferenceStore, screen: Screen) -> ViewPreferences {
    match store.load(screen.key()) {
        Ok(Some(blob)) => ViewPreferences::from_blob(screen, &blob),
        Ok(None) => screen.defaults(),
        Err(e) => {
            tracing::warn!(screen = screen.key(), error = %e, "failed to read preferences");
            screen.defaults()
        }
    }
}

/// Write a screen's preferences. A failed write is logged, never surfaced.
pub fn save_preferences(store: &dyn PreferenceStore, screen: Screen, prefs: &ViewPreferences) {
    if let Err(e) = store.save(screen.key(), &prefs.to_blob()) {
        tracing::warn!(screen = screen.key(), error = %e, "failed to save preferences");
    }
}

/// Resolve the path to preferences.db inside the data directory.
/// e.g. on Linux: ~/.local/share/gameshelf/preferences.db
pub fn get_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("preferences.db")
}

/// Create the table if it doesn't already exist.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS preferences (
            screen     TEXT PRIMARY KEY,
            blob       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    ",
    )
}

pub struct SqlitePreferenceStore {
    conn: Mutex<Connection>,
}

// Lock the connection, mapping a poisoned mutex to our error type.
macro_rules! db {
    ($store:expr) => {
        $store
            .conn
            .lock()
            .map_err(|e| Error::Internal(format!("preferences lock poisoned: {e}")))?
    };
}

impl SqlitePreferenceStore {
    /// Open (creating if needed) the database file and its parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = db!(self);
        let blob = conn
            .query_row(
                "SELECT blob FROM preferences WHERE screen = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        let conn = db!(self);
        conn.execute(
            "INSERT INTO preferences (screen, blob, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(screen) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
            params![key, blob, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Process-local store for tests and `--no-persist` runs.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    blobs: Mutex<std::collections::HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| Error::Internal(format!("preferences lock poisoned: {e}")))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| Error::Internal(format!("preferences lock poisoned: {e}")))?;
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_individually() {
        let prefs = ViewPreferences::from_blob(Screen::Catalog, r#"{"viewMode":"list","pageSize":7}"#);
        assert_eq!(prefs.view_mode, ViewMode::List);
        assert_eq!(prefs.page_size, DEFAULT_CATALOG_PAGE_SIZE);
        assert_eq!(prefs.sort, SortSpec::new(SortKey::Title, SortDirection::Asc));
    }

    #[test]
    fn test_sort_key_must_belong_to_screen() {
        let prefs = ViewPreferences::from_blob(Screen::Library, r#"{"sortKey":"rating","sortDirection":"asc"}"#);
        assert_eq!(prefs.sort.key, SortKey::Playtime);
        assert_eq!(prefs.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_garbage_blob_gives_defaults() {
        assert_eq!(ViewPreferences::from_blob(Screen::Catalog, "[1,2]"), Screen::Catalog.defaults());
        assert_eq!(ViewPreferences::from_blob(Screen::Catalog, "nope"), Screen::Catalog.defaults());
    }

    #[test]
    fn test_blob_survives_store_round_trip() {
        let store = SqlitePreferenceStore::in_memory().unwrap();
        let prefs = ViewPreferences {
            view_mode: ViewMode::List,
            sort: SortSpec::new(SortKey::DateAdded, SortDirection::Desc),
            page_size: 48,
        };
        save_preferences(&store, Screen::Catalog, &prefs);
        assert_eq!(load_preferences(&store, Screen::Catalog), prefs);
        assert_eq!(load_preferences(&store, Screen::Library), Screen::Library.defaults());
    }
}
