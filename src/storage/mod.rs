// SPDX-License-Identifier: MIT
//! SQLite storage for wishes and practice sessions.
//!
//! The database lives at `{data_dir}/triad.db` (WAL journal, synchronous
//! NORMAL). Schema is bootstrapped lazily with `CREATE TABLE IF NOT EXISTS`
//! on open. Timestamps are stored as RFC 3339 TEXT, dates as `YYYY-MM-DD`
//! TEXT, ids as UUID v4 strings.

pub mod progress;

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use tracing::warn;
use uuid::Uuid;

use crate::model::{Mood, PracticeSession, TimeSlot, Wish, WishCategory};

/// Errors callers may want to branch on. Everything else is surfaced as a
/// plain `anyhow` error with context.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("wish not found: {0}")]
    WishNotFound(String),
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
struct WishRow {
    id: String,
    user_id: String,
    title: String,
    affirmation: String,
    category: String,
    is_active: bool,
    created_at: String,
}

impl WishRow {
    /// Convert to the domain type. Rows with unparseable fields are treated
    /// as absent by list paths rather than failing the whole query.
    fn into_wish(self) -> Option<Wish> {
        let category = match self.category.parse::<WishCategory>() {
            Ok(c) => c,
            Err(e) => {
                warn!(id = %self.id, err = %e, "skipping wish row with bad category");
                return None;
            }
        };
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        Some(Wish {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            affirmation: self.affirmation,
            category,
            is_active: self.is_active,
            created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PracticeSessionRow {
    id: String,
    wish_id: String,
    user_id: String,
    date: String,
    time_slot: String,
    completed_count: i64,
    target_count: i64,
    mood: Option<String>,
    affirmation_text: String,
    created_at: String,
}

impl PracticeSessionRow {
    fn into_session(self) -> Option<PracticeSession> {
        let date = match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                warn!(id = %self.id, err = %e, "skipping session row with bad date");
                return None;
            }
        };
        let time_slot = match self.time_slot.parse::<TimeSlot>() {
            Ok(s) => s,
            Err(e) => {
                warn!(id = %self.id, err = %e, "skipping session row with bad time slot");
                return None;
            }
        };
        // A mood that fails to parse degrades to "no mood" — the session
        // itself is still usable by every non-mood aggregation.
        let mood = self.mood.as_deref().and_then(|m| m.parse::<Mood>().ok());
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        Some(PracticeSession {
            id: self.id,
            wish_id: self.wish_id,
            user_id: self.user_id,
            date,
            time_slot,
            completed_count: self.completed_count.max(0) as u32,
            target_count: self.target_count.max(0) as u32,
            mood,
            affirmation_text: self.affirmation_text,
            created_at,
        })
    }
}

fn parse_timestamp(raw: &str, id: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            warn!(id = %id, err = %e, "skipping row with bad timestamp");
            None
        }
    }
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("triad.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    /// Used to create a [`progress::SqliteProgressStore`] sharing the same
    /// SQLite connection.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS wishes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                title       TEXT NOT NULL,
                affirmation TEXT NOT NULL,
                category    TEXT NOT NULL,
                is_active   INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await
        .context("create wishes table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS practice_sessions (
                id               TEXT PRIMARY KEY,
                wish_id          TEXT NOT NULL,
                user_id          TEXT NOT NULL,
                date             TEXT NOT NULL,
                time_slot        TEXT NOT NULL,
                completed_count  INTEGER NOT NULL,
                target_count     INTEGER NOT NULL,
                mood             TEXT,
                affirmation_text TEXT NOT NULL DEFAULT '',
                created_at       TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await
        .context("create practice_sessions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_user_date
               ON practice_sessions (user_id, date)",
        )
        .execute(pool)
        .await
        .context("create session index")?;

        Ok(())
    }

    // ─── Wishes ─────────────────────────────────────────────────────────────

    pub async fn create_wish(
        &self,
        user_id: &str,
        title: &str,
        affirmation: &str,
        category: WishCategory,
        now: DateTime<Utc>,
    ) -> Result<Wish> {
        let wish = Wish {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            affirmation: affirmation.to_string(),
            category,
            is_active: true,
            created_at: now,
        };
        sqlx::query(
            "INSERT INTO wishes (id, user_id, title, affirmation, category, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&wish.id)
        .bind(&wish.user_id)
        .bind(&wish.title)
        .bind(&wish.affirmation)
        .bind(wish.category.as_str())
        .bind(wish.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("insert wish")?;
        Ok(wish)
    }

    pub async fn get_wish(&self, id: &str) -> Result<Wish> {
        let row: Option<WishRow> = sqlx::query_as("SELECT * FROM wishes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("load wish")?;
        row.and_then(WishRow::into_wish)
            .ok_or_else(|| StorageError::WishNotFound(id.to_string()).into())
    }

    /// List a user's wishes, newest first. Unknown users yield an empty list.
    pub async fn list_wishes(&self, user_id: &str, include_archived: bool) -> Result<Vec<Wish>> {
        let sql = if include_archived {
            "SELECT * FROM wishes WHERE user_id = ? ORDER BY created_at DESC"
        } else {
            "SELECT * FROM wishes WHERE user_id = ? AND is_active = 1 ORDER BY created_at DESC"
        };
        let rows: Vec<WishRow> = sqlx::query_as(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("list wishes")?;
        Ok(rows.into_iter().filter_map(WishRow::into_wish).collect())
    }

    /// Total wishes the user has ever created, archived ones included.
    pub async fn wish_count(&self, user_id: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("wish count")?;
        Ok(count as u64)
    }

    /// Soft delete: hide the wish while keeping its practice history.
    pub async fn archive_wish(&self, id: &str) -> Result<()> {
        let affected = sqlx::query("UPDATE wishes SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("archive wish")?
            .rows_affected();
        if affected == 0 {
            return Err(StorageError::WishNotFound(id.to_string()).into());
        }
        Ok(())
    }

    /// Hard delete: removes the wish and cascades to its practice sessions.
    pub async fn delete_wish(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.context("begin delete wish")?;
        sqlx::query("DELETE FROM practice_sessions WHERE wish_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete wish sessions")?;
        let affected = sqlx::query("DELETE FROM wishes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete wish")?
            .rows_affected();
        if affected == 0 {
            tx.rollback().await.ok();
            return Err(StorageError::WishNotFound(id.to_string()).into());
        }
        tx.commit().await.context("commit delete wish")?;
        Ok(())
    }

    // ─── Practice sessions ──────────────────────────────────────────────────

    pub async fn record_session(&self, session: &PracticeSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO practice_sessions
                (id, wish_id, user_id, date, time_slot, completed_count,
                 target_count, mood, affirmation_text, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.wish_id)
        .bind(&session.user_id)
        .bind(session.date.format("%Y-%m-%d").to_string())
        .bind(session.time_slot.as_str())
        .bind(session.completed_count as i64)
        .bind(session.target_count as i64)
        .bind(session.mood.map(|m| m.as_str()))
        .bind(&session.affirmation_text)
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("insert practice session")?;
        Ok(())
    }

    /// All of a user's sessions ordered by date then creation time.
    /// Unknown users yield an empty list.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<PracticeSession>> {
        let rows: Vec<PracticeSessionRow> = sqlx::query_as(
            "SELECT * FROM practice_sessions WHERE user_id = ?
             ORDER BY date ASC, created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list sessions")?;
        Ok(rows
            .into_iter()
            .filter_map(PracticeSessionRow::into_session)
            .collect())
    }

    /// Sessions dated on or after `since`, ordered ascending.
    pub async fn list_sessions_since(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<PracticeSession>> {
        let rows: Vec<PracticeSessionRow> = sqlx::query_as(
            "SELECT * FROM practice_sessions WHERE user_id = ? AND date >= ?
             ORDER BY date ASC, created_at ASC",
        )
        .bind(user_id)
        .bind(since.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await
        .context("list sessions since")?;
        Ok(rows
            .into_iter()
            .filter_map(PracticeSessionRow::into_session)
            .collect())
    }

    /// Total sessions the user has ever recorded.
    pub async fn session_count(&self, user_id: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM practice_sessions WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .context("session count")?;
        Ok(count as u64)
    }
}
