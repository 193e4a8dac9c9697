// error.rs — The crate-wide error type.
//
// Everything that talks to the backend, the preference database or the
// filesystem returns `Result<T>`. Controllers catch these at the screen
// boundary; the pipeline never produces them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but the envelope reports a failure.
    #[error("Backend error {code}: {message}")]
    Api { code: i32, message: String },

    /// The body was not the JSON shape the endpoint promises.
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The owning controller was closed while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

// RUST NOTE: ureq folds "server said 4xx/5xx" and "no response at all" into one
// error type. We split them so callers can tell an application error from a
// dead network.
impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                    .unwrap_or(body);
                Error::Api { code: code as i32, message }
            }
            ureq::Error::Transport(t) => Error::Transport(t.to_string()),
        }
    }
}
