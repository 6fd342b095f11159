//! Spaced repetition review scheduling for a fixed catalog of quiz items,
//! based on SM-2.
//!
//! The core ([`advance`], [`due_queue`], [`ReviewHistory`]) is pure; stores
//! in [`database`] and [`export`] persist the history as a whole.

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::{SavePolicy, StoreBackend, StoreConfig, load_store_config, open_store};
pub use database::{HistoryStore, MemoryStore, SqliteStore};
pub use error::{Result, StoreError};
pub use export::JsonFileStore;
pub use models::{
    CardMaturity, Quality, ReviewCard, ReviewHistory, ReviewSession, ReviewStats, ReviewTotals,
    advance, due_queue, review_stats,
};
