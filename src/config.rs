// config.rs — Runtime configuration from the environment.
//
// `.env` is loaded first (see main.rs), then:
//   GAMESHELF_API_URL       backend API root       (default http://localhost:8080/api)
//   GAMESHELF_TIMEOUT_SECS  per-request timeout    (default 15)
//   GAMESHELF_DATA_DIR      where preferences.db lives (default <data dir>/gameshelf)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url:  String,
    pub timeout:  Duration,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("GAMESHELF_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match lookup("GAMESHELF_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::InvalidInput(format!("GAMESHELF_TIMEOUT_SECS must be a whole number, got '{raw}'"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let data_dir = lookup("GAMESHELF_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            data_dir,
        })
    }

    pub fn preferences_path(&self) -> PathBuf {
        crate::prefs::get_db_path(&self.data_dir)
    }
}

/// e.g. on Windows: C:\Users\<user>\AppData\Roaming\gameshelf
///      on macOS:   ~/Library/Application Support/gameshelf
///      on Linux:   ~/.local/share/gameshelf
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gameshelf")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.data_dir.ends_with("gameshelf"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GAMESHELF_API_URL", "http://games.lan/api"),
            ("GAMESHELF_TIMEOUT_SECS", "3"),
            ("GAMESHELF_DATA_DIR", "/tmp/shelf"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://games.lan/api");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/shelf/preferences.db"));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("GAMESHELF_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("GAMESHELF_TIMEOUT_SECS"));
    }
}
