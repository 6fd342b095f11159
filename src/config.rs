//! Store configuration.
//!
//! Resolved with priority: `config.toml` `[store]` table > environment
//! (`.env` is loaded first) > defaults.

use crate::database::{HistoryStore, SqliteStore};
use crate::error::{Result, StoreError};
use crate::export::JsonFileStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE: &str = "config.toml";
pub const BACKEND_ENV: &str = "REVIEW_STORE_BACKEND";
pub const PATH_ENV: &str = "REVIEW_STORE_PATH";
pub const DEFAULT_JSON_PATH: &str = "data/review_history.json";
pub const DEFAULT_SQLITE_PATH: &str = "data/review_history.sqlite3";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

impl StoreBackend {
    pub fn default_path(self) -> PathBuf {
        match self {
            StoreBackend::Json => PathBuf::from(DEFAULT_JSON_PATH),
            StoreBackend::Sqlite => PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(StoreError::UnknownBackend(other.to_string())),
        }
    }
}

/// When a review session writes the history back
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Full history saved after every graded review
    #[default]
    EveryReview,
    /// Saved once when the session finishes
    SessionEnd,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
    pub save_policy: SavePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let backend = StoreBackend::default();
        Self {
            backend,
            path: backend.default_path(),
            save_policy: SavePolicy::default(),
        }
    }
}

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    store: Option<StoreSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreSection {
    backend: Option<StoreBackend>,
    path: Option<String>,
    save_policy: Option<SavePolicy>,
}

/// Load store configuration from `config.toml` in the working directory,
/// then the environment.
pub fn load_store_config() -> StoreConfig {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    load_store_config_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Same as [`load_store_config`] with an explicit file and environment lookup.
pub fn load_store_config_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> StoreConfig {
    let section = read_store_section(config_path).unwrap_or_default();

    let backend = section
        .backend
        .or_else(|| {
            let raw = env(BACKEND_ENV)?;
            match raw.parse::<StoreBackend>() {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", BACKEND_ENV, e);
                    None
                }
            }
        })
        .unwrap_or_default();

    let path = if let Some(path) = section.path {
        tracing::info!("Using review store from {}: {}", config_path.display(), path);
        PathBuf::from(path)
    } else if let Some(path) = env(PATH_ENV) {
        tracing::info!("Using review store from {} env: {}", PATH_ENV, path);
        PathBuf::from(path)
    } else {
        let default = backend.default_path();
        tracing::info!("Using default review store path: {}", default.display());
        default
    };

    StoreConfig {
        backend,
        path,
        save_policy: section.save_policy.unwrap_or_default(),
    }
}

fn read_store_section(config_path: &Path) -> Option<StoreSection> {
    let contents = std::fs::read_to_string(config_path).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => config.store,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", config_path.display(), e);
            None
        }
    }
}

/// Opens the store described by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Box<dyn HistoryStore>> {
    let store: Box<dyn HistoryStore> = match config.backend {
        StoreBackend::Json => Box::new(JsonFileStore::new(&config.path)),
        StoreBackend::Sqlite => Box::new(SqliteStore::open(&config.path)?),
    };
    Ok(store)
}
