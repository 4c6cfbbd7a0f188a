//! Authentication session
//!
//! The bearer token lives in an explicit `Session` value that is handed to
//! the API client. Durability comes from `SessionStore`, a small TOML file
//! with a single `token` key:
//!
//! ```toml
//! token = "eyJhbGciOi..."
//! ```
//!
//! Location, in priority order:
//! 1. `CASEGEN_SESSION_PATH`
//! 2. nearest `.casegen/session.toml` walking up from the working directory
//! 3. `.casegen/session.toml` in the working directory

use crate::api::Backend;
use crate::config::{find_upwards, CONFIG_DIR};
use crate::forms::LoginForm;
use crate::model::User;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the session file location
pub const SESSION_PATH_ENV: &str = "CASEGEN_SESSION_PATH";

const SESSION_FILE: &str = "session.toml";

/// Current authentication state
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// File-backed token storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the session file location (see module docs)
    pub fn locate() -> Self {
        if let Ok(path) = std::env::var(SESSION_PATH_ENV) {
            return Self::at(path);
        }
        let found = std::env::current_dir()
            .ok()
            .and_then(|dir| find_upwards(&dir, SESSION_FILE));
        match found {
            Some(path) => Self::at(path),
            None => Self::at(Path::new(CONFIG_DIR).join(SESSION_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing file is an anonymous session.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: SessionFile = toml::from_str(&contents)?;
        Ok(Session {
            token: file.token.filter(|t| !t.is_empty()),
        })
    }

    /// Persist the session; an anonymous session removes the file
    pub fn save(&self, session: &Session) -> Result<()> {
        if !session.is_authenticated() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = SessionFile {
            token: session.token.clone(),
        };
        std::fs::write(&self.path, toml::to_string(&file)?)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Forget the stored token
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Startup check: look up the current user for the stored token.
///
/// An authentication failure means the session is stale: the token is
/// removed and `None` is returned. Transport errors are passed through
/// without touching the stored token.
pub fn restore_session(store: &SessionStore, backend: &dyn Backend) -> Result<Option<User>> {
    let session = store.load()?;
    if !session.is_authenticated() {
        return Ok(None);
    }
    match backend.current_user(&session) {
        Ok(user) => Ok(Some(user)),
        Err(e) if e.is_auth_failure() => {
            tracing::info!("stored session rejected by backend, clearing it");
            store.clear()?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Exchange credentials for a token and persist it.
///
/// The token is written only after the backend accepts it for a
/// current-user lookup, so a failed login never leaves a token behind.
pub fn log_in(store: &SessionStore, backend: &dyn Backend, form: &LoginForm) -> Result<User> {
    let token = backend.login(form)?;
    let session = Session::with_token(token.access_token);
    let user = backend.current_user(&session)?;
    store.save(&session)?;
    tracing::info!(username = %user.username, "logged in");
    Ok(user)
}
