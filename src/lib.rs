// lib.rs — gameshelf library crate.
//
// Layout:
//   models       wire types (games, library entries, metadata results)
//   dates        the backend's two date encodings → chrono
//   api          BackendClient trait + the ureq-backed HttpBackend
//   pipeline     filter → sort → paginate → aggregate, all pure
//   controllers  one per screen, owning its state and cancellation
//   prefs        per-screen view preferences (SQLite or in-memory)
//   notify       user-facing notices
//   format       playtime / date / rating renderings
//   config       environment configuration

pub mod api;
pub mod config;
pub mod controllers;
pub mod dates;
pub mod error;
pub mod format;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod prefs;

pub use error::{Error, Result};
