// SPDX-License-Identifier: MIT
//! Progress repository — streak state, achievement unlocks, and the points
//! ledger behind a storage-agnostic trait.
//!
//! The engine's calculators are pure; this seam is the only place derived
//! progress is read or written. Two implementations: SQLite (shares the
//! main pool, tables created on first use) and in-memory (tests).

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::achievements;
use crate::model::{Achievement, UserStreak};

/// Storage seam for derived progress state.
///
/// `unlock_achievement` is idempotent: it returns `true` only on the first
/// unlock of an id for a user, so callers can award points exactly once.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load a user's streak state; unknown users get the zeroed default.
    async fn get_streak(&self, user_id: &str) -> Result<UserStreak>;

    async fn put_streak(&self, user_id: &str, streak: &UserStreak) -> Result<()>;

    /// The full achievement catalog with the user's unlock state joined in.
    async fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>>;

    /// Record an unlock. Returns `true` if this was a new unlock.
    async fn unlock_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Append a points award to the ledger.
    async fn add_points(&self, user_id: &str, points: u32, reason: &str) -> Result<()>;

    /// Sum of all points ever awarded to the user.
    async fn total_points(&self, user_id: &str) -> Result<u64>;
}

/// Join unlock rows onto the catalog in display order.
fn join_catalog(mut unlocks: HashMap<String, DateTime<Utc>>) -> Vec<Achievement> {
    achievements::catalog()
        .into_iter()
        .map(|def| {
            let unlocked_at = unlocks.remove(def.id);
            Achievement {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                points: def.points,
                feature_unlock: def.feature_unlock.map(str::to_string),
                unlocked: unlocked_at.is_some(),
                unlocked_at,
            }
        })
        .collect()
}

// ─── SQLite implementation ────────────────────────────────────────────────────

pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the progress tables on first use so they do not block open.
    async fn ensure_tables(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_streaks (
                user_id    TEXT PRIMARY KEY,
                state      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("create user_streaks table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS achievement_unlocks (
                user_id        TEXT NOT NULL,
                achievement_id TEXT NOT NULL,
                unlocked_at    TEXT NOT NULL,
                PRIMARY KEY (user_id, achievement_id)
            )",
        )
        .execute(&self.pool)
        .await
        .context("create achievement_unlocks table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS points_ledger (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                points     INTEGER NOT NULL,
                reason     TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("create points_ledger table")?;

        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for SqliteProgressStore {
    async fn get_streak(&self, user_id: &str) -> Result<UserStreak> {
        self.ensure_tables().await?;
        let row: Option<(String,)> =
            sqlx::query_as("SELECT state FROM user_streaks WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("load streak state")?;
        let Some((state,)) = row else {
            return Ok(UserStreak::default());
        };
        match serde_json::from_str(&state) {
            Ok(streak) => Ok(streak),
            Err(e) => {
                // An unreadable blob is treated as absent; the next recompute
                // rebuilds it from session history.
                warn!(user = user_id, err = %e, "discarding unreadable streak state");
                Ok(UserStreak::default())
            }
        }
    }

    async fn put_streak(&self, user_id: &str, streak: &UserStreak) -> Result<()> {
        self.ensure_tables().await?;
        let state = serde_json::to_string(streak).context("serialize streak state")?;
        sqlx::query(
            "INSERT INTO user_streaks (user_id, state, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET state = excluded.state,
                                                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(&state)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("store streak state")?;
        Ok(())
    }

    async fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        self.ensure_tables().await?;
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT achievement_id, unlocked_at FROM achievement_unlocks WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("load achievement unlocks")?;

        let unlocks: HashMap<String, DateTime<Utc>> = rows
            .into_iter()
            .filter_map(|(id, at)| {
                match DateTime::parse_from_rfc3339(&at) {
                    Ok(t) => Some((id, t.with_timezone(&Utc))),
                    Err(e) => {
                        warn!(achievement = %id, err = %e, "skipping unlock row with bad timestamp");
                        None
                    }
                }
            })
            .collect();

        Ok(join_catalog(unlocks))
    }

    async fn unlock_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.ensure_tables().await?;
        let rows_affected = sqlx::query(
            "INSERT OR IGNORE INTO achievement_unlocks (user_id, achievement_id, unlocked_at)
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("unlock achievement")?
        .rows_affected();
        Ok(rows_affected > 0)
    }

    async fn add_points(&self, user_id: &str, points: u32, reason: &str) -> Result<()> {
        self.ensure_tables().await?;
        sqlx::query(
            "INSERT INTO points_ledger (id, user_id, points, reason, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(points as i64)
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("append points")?;
        Ok(())
    }

    async fn total_points(&self, user_id: &str) -> Result<u64> {
        self.ensure_tables().await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM points_ledger WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("sum points")?;
        Ok(total.max(0) as u64)
    }
}

// ─── In-memory implementation ─────────────────────────────────────────────────

/// HashMap-backed store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryProgressStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    streaks: HashMap<String, UserStreak>,
    unlocks: HashMap<String, HashMap<String, DateTime<Utc>>>,
    points: HashMap<String, Vec<(u32, String)>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for MemoryProgressStore {
    async fn get_streak(&self, user_id: &str) -> Result<UserStreak> {
        let inner = self.inner.lock().await;
        Ok(inner.streaks.get(user_id).cloned().unwrap_or_default())
    }

    async fn put_streak(&self, user_id: &str, streak: &UserStreak) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.streaks.insert(user_id.to_string(), streak.clone());
        Ok(())
    }

    async fn list_achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        let inner = self.inner.lock().await;
        let unlocks = inner.unlocks.get(user_id).cloned().unwrap_or_default();
        Ok(join_catalog(unlocks))
    }

    async fn unlock_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let unlocks = inner.unlocks.entry(user_id.to_string()).or_default();
        if unlocks.contains_key(achievement_id) {
            return Ok(false);
        }
        unlocks.insert(achievement_id.to_string(), now);
        Ok(true)
    }

    async fn add_points(&self, user_id: &str, points: u32, reason: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .points
            .entry(user_id.to_string())
            .or_default()
            .push((points, reason.to_string()));
        Ok(())
    }

    async fn total_points(&self, user_id: &str) -> Result<u64> {
        let inner = self.inner.lock().await;
        Ok(inner
            .points
            .get(user_id)
            .map(|entries| entries.iter().map(|(p, _)| *p as u64).sum())
            .unwrap_or(0))
    }
}
