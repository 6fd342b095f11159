//! SQLite persistence for the review history
//!
//! One row per card in `review_cards` and a single row of aggregate counters
//! in `review_totals`. Saving rewrites both tables in one transaction.

use super::HistoryStore;
use crate::error::Result as StoreResult;
use crate::models::review_card::{DEFAULT_EASINESS_FACTOR, MIN_EASINESS_FACTOR};
use crate::models::{ReviewCard, ReviewHistory, ReviewTotals};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, Row, params};
use std::path::Path;
use tracing::info;

/// Creates the review tables if they don't exist yet
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_cards (
            item_id TEXT PRIMARY KEY,
            easiness_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetitions INTEGER NOT NULL DEFAULT 0,
            next_review_at INTEGER NOT NULL,
            last_reviewed_at INTEGER NOT NULL DEFAULT 0,
            total_reviews INTEGER NOT NULL DEFAULT 0,
            correct_count INTEGER NOT NULL DEFAULT 0,
            incorrect_count INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    // Single row, present once a history has been saved
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_totals (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            total_questions_reviewed INTEGER NOT NULL DEFAULT 0,
            total_correct INTEGER NOT NULL DEFAULT 0,
            total_incorrect INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

/// Opens (or creates) the database file and its tables
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Reads the whole history. Returns `None` if nothing was saved yet.
/// A missing totals row is rebuilt from the cards.
pub fn load_history(conn: &Connection) -> Result<Option<ReviewHistory>> {
    let totals = conn.query_row(
        "SELECT total_questions_reviewed, total_correct, total_incorrect
         FROM review_totals WHERE id = 1",
        [],
        |row| {
            Ok(ReviewTotals {
                total_questions_reviewed: clamp_total(row.get(0)?),
                total_correct: clamp_total(row.get(1)?),
                total_incorrect: clamp_total(row.get(2)?),
            })
        },
    );
    let totals = match totals {
        Ok(totals) => Some(totals),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e),
    };

    let mut stmt = conn.prepare(
        "SELECT item_id, easiness_factor, interval_days, repetitions, next_review_at,
                last_reviewed_at, total_reviews, correct_count, incorrect_count
         FROM review_cards",
    )?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<Result<Vec<ReviewCard>>>()?;

    if totals.is_none() && cards.is_empty() {
        return Ok(None);
    }

    // from_parts derives the totals again when they don't match the cards
    Ok(Some(ReviewHistory::from_parts(cards, totals.unwrap_or_default())))
}

/// Replaces the stored history, cards and totals together
pub fn save_history(history: &ReviewHistory, conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM review_cards", ())?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO review_cards (item_id, easiness_factor, interval_days, repetitions,
                 next_review_at, last_reviewed_at, total_reviews, correct_count, incorrect_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for card in history.cards() {
            stmt.execute(params![
                card.item_id,
                card.easiness_factor,
                card.interval,
                card.repetitions,
                card.next_review_at.timestamp_millis(),
                card.last_reviewed_at.map_or(0, |dt| dt.timestamp_millis()),
                card.total_reviews,
                card.correct_count,
                card.incorrect_count,
            ])?;
        }
    }

    let totals = history.totals();
    tx.execute(
        "INSERT OR REPLACE INTO review_totals (id, total_questions_reviewed, total_correct, total_incorrect)
         VALUES (1, ?1, ?2, ?3)",
        params![
            to_sql_count(totals.total_questions_reviewed),
            to_sql_count(totals.total_correct),
            to_sql_count(totals.total_incorrect),
        ],
    )?;
    tx.commit()
}

/// Deletes every card and the totals row
pub fn reset_history(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM review_cards", ())?;
    tx.execute("DELETE FROM review_totals", ())?;
    tx.commit()
}

fn card_from_row(row: &Row) -> Result<ReviewCard> {
    let easiness_factor: f64 = row.get(1)?;
    let last_reviewed_at: i64 = row.get(5)?;
    Ok(ReviewCard {
        item_id: row.get(0)?,
        easiness_factor: if easiness_factor.is_finite() {
            easiness_factor.max(MIN_EASINESS_FACTOR)
        } else {
            DEFAULT_EASINESS_FACTOR
        },
        interval: clamp_count(row.get(2)?),
        repetitions: clamp_count(row.get(3)?),
        // Unreadable due dates become the epoch, i.e. due now
        next_review_at: DateTime::from_timestamp_millis(row.get(4)?).unwrap_or_default(),
        last_reviewed_at: if last_reviewed_at > 0 {
            DateTime::<Utc>::from_timestamp_millis(last_reviewed_at)
        } else {
            None
        },
        total_reviews: clamp_count(row.get(6)?),
        correct_count: clamp_count(row.get(7)?),
        incorrect_count: clamp_count(row.get(8)?),
    })
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn clamp_total(value: i64) -> u64 {
    value.max(0) as u64
}

fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// [`HistoryStore`] backed by a SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = init_database(path)?;
        info!("Opened review database at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl HistoryStore for SqliteStore {
    fn load(&self) -> StoreResult<Option<ReviewHistory>> {
        Ok(load_history(&self.conn)?)
    }

    fn save(&mut self, history: &ReviewHistory) -> StoreResult<()> {
        Ok(save_history(history, &mut self.conn)?)
    }

    fn reset(&mut self) -> StoreResult<()> {
        reset_history(&mut self.conn)?;
        info!("Review history reset");
        Ok(())
    }
}
