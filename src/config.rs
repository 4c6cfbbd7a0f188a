//! Configuration file support for casegen
//!
//! Reads from .casegen/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "CASEGEN_API_URL";

/// Directory holding config and session files
pub const CONFIG_DIR: &str = ".casegen";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// List view settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Backend connection settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the generator backend
    /// Default: "http://127.0.0.1:8000"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout. Generation can take a while.
    /// Default: 120
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// List view settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ViewConfig {
    /// Projects per dashboard page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_page_size() -> usize {
    crate::view::PAGE_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Load config from .casegen/config.toml
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        let mut config = Self::find_config_path()
            .and_then(|path| match Self::from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                    None
                }
            })
            .unwrap_or_default();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }
        config
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        find_upwards(&current_dir, "config.toml")
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

/// Walk up from `start` looking for `.casegen/<file_name>`
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(CONFIG_DIR).join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}
