//! Error taxonomy for the client
//!
//! Validation errors are raised before any network call. Remote failures
//! carry the HTTP status and the backend's `detail` message when it sent
//! one. `Unauthorized` means the stored session is stale.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field was empty or an input was malformed
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The backend answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("Could not reach the backend: {0}")]
    Transport(String),

    /// Missing or rejected credentials
    #[error("Not authenticated. Run 'casegen login' first.")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export failed: {0}")]
    Export(#[from] crate::export::ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether retrying after a fresh login could help
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Unauthorized | Error::Api { status: 401, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) if status.as_u16() == 401 => Error::Unauthorized,
            Some(status) => Error::Api {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Error::Transport(e.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
