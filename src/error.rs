//! Errors raised at the persistence boundary.
//!
//! The scheduling core itself never fails; only loading, saving and
//! configuring a store can.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown store backend: {0}")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
