//! Configuration for the placement engine.
//!
//! Settings are layered with the following priority (highest first):
//!
//! 1. Environment variables (`BOARD_PLACEMENT_BASE_URL`)
//! 2. TOML file with `[sync]` and `[board]` sections
//! 3. Compiled defaults
//!
//! Every file field is optional, so a partial file only overrides what it
//! names.

use crate::placement::domain::{BoardView, PlacementPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the sync base URL.
pub const BASE_URL_ENV: &str = "BOARD_PLACEMENT_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_ENV: &str = "BOARD_PLACEMENT_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A timeout of zero seconds was configured.
    #[error("sync timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PlacementConfigFile {
    sync: SyncFileConfig,
    board: BoardFileConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SyncFileConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    token_env: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BoardFileConfig {
    view: Option<BoardView>,
    confine_approvals: Option<bool>,
}

/// Remote sync settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Base URL of the project API.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Environment variable holding the bearer token, if any.
    pub token_env: Option<String>,
}

impl SyncSettings {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reads the bearer token from the configured environment variable.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty())
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_env: Some(DEFAULT_TOKEN_ENV.to_owned()),
        }
    }
}

/// Board behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    /// Drop surface shown when the board opens.
    pub view: BoardView,
    /// Keep Approval tasks out of status columns.
    pub confine_approvals: bool,
}

impl BoardSettings {
    /// Returns the transition policy these settings describe.
    #[must_use]
    pub const fn policy(&self) -> PlacementPolicy {
        PlacementPolicy {
            confine_approvals: self.confine_approvals,
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            view: BoardView::default(),
            confine_approvals: PlacementPolicy::default().confine_approvals,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementConfig {
    /// Remote sync settings.
    pub sync: SyncSettings,
    /// Board behaviour settings.
    pub board: BoardSettings,
}

impl PlacementConfig {
    /// Reads and resolves a TOML configuration file, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when a value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Resolves configuration from TOML text without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseToml`] for invalid TOML and
    /// [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: PlacementConfigFile = toml::from_str(contents)?;
        Self::resolve(file)
    }

    fn resolve(file: PlacementConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_secs = file
            .sync
            .timeout_secs
            .unwrap_or(defaults.sync.timeout_secs);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            sync: SyncSettings {
                base_url: file.sync.base_url.unwrap_or(defaults.sync.base_url),
                timeout_secs,
                token_env: file.sync.token_env.or(defaults.sync.token_env),
            },
            board: BoardSettings {
                view: file.board.view.unwrap_or(defaults.board.view),
                confine_approvals: file
                    .board
                    .confine_approvals
                    .unwrap_or(defaults.board.confine_approvals),
            },
        })
    }

    /// Applies environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.sync.base_url = base_url.trim().to_owned();
        }
        self
    }
}
