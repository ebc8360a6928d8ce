// SPDX-License-Identifier: MIT
//! Practice engine — orchestrates the complete-practice flow and the
//! read-side derivations.
//!
//! The engine owns no logic of its own: it fetches records, hands them to
//! the pure calculators, and persists what they return. Time is always
//! passed in by the caller.

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::achievements::{self, EvaluationInput};
use crate::analytics::{self, insights::PracticeInsight, model::AnalyticsData, LookbackWindow};
use crate::model::{
    Achievement, Milestone, Mood, PracticeSession, TimeSlot, UserStreak, Wish, WishCategory,
    DAILY_TARGET,
};
use crate::storage::{progress::ProgressRepository, Storage};
use crate::streak;

/// Everything a caller needs to render the result of one logged practice.
#[derive(Debug, Clone)]
pub struct PracticeOutcome {
    pub session: PracticeSession,
    pub streak: UserStreak,
    pub new_milestones: Vec<Milestone>,
    pub new_achievements: Vec<Achievement>,
    /// Total points credited to the ledger by this practice.
    pub points_awarded: u32,
}

/// Snapshot of a user's standing for the status view.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub streak: UserStreak,
    /// Completed units logged for `today`.
    pub today_units: u32,
    /// Whether `today` has reached the 18-unit goal.
    pub today_completed: bool,
    pub total_points: u64,
}

pub struct PracticeEngine {
    storage: Arc<Storage>,
    progress: Arc<dyn ProgressRepository>,
}

impl PracticeEngine {
    pub fn new(storage: Arc<Storage>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { storage, progress }
    }

    /// Record one practice session and roll the derived state forward.
    ///
    /// `date` is the calendar day the session counts toward (defaults to
    /// `now`'s day; users may backfill earlier days). Returns the newly
    /// unlocked milestones and achievements so the caller can notify.
    #[allow(clippy::too_many_arguments)]
    pub async fn complete_practice(
        &self,
        user_id: &str,
        wish_id: &str,
        slot: TimeSlot,
        completed_count: u32,
        mood: Option<Mood>,
        affirmation_text: &str,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<PracticeOutcome> {
        let wish = self
            .storage
            .get_wish(wish_id)
            .await
            .context("look up wish for practice")?;
        if wish.user_id != user_id {
            bail!("wish {wish_id} does not belong to user {user_id}");
        }

        let today = now.date_naive();
        let session = PracticeSession {
            id: Uuid::new_v4().to_string(),
            wish_id: wish.id.clone(),
            user_id: user_id.to_string(),
            date: date.unwrap_or(today),
            time_slot: slot,
            completed_count,
            target_count: slot.target_count(),
            mood,
            affirmation_text: affirmation_text.to_string(),
            created_at: now,
        };
        self.storage.record_session(&session).await?;
        debug!(
            user = user_id,
            wish = %wish.id,
            slot = slot.as_str(),
            count = completed_count,
            "practice recorded"
        );

        // Recompute the streak over the full history and persist it.
        let sessions = self.storage.list_sessions(user_id).await?;
        let previous = self.progress.get_streak(user_id).await?;
        let update = streak::recompute(&previous, &sessions, today, now);
        self.progress.put_streak(user_id, &update.streak).await?;

        let mut points_awarded = 0u32;
        for milestone in &update.new_milestones {
            let points = streak::milestone_points(milestone.days);
            self.progress
                .add_points(user_id, points, &format!("milestone: {} days", milestone.days))
                .await?;
            points_awarded += points;
            info!(user = user_id, days = milestone.days, points, "milestone reached");
        }

        let new_achievements = self
            .evaluate_achievements(user_id, &sessions, update.streak.current_streak, today, now)
            .await?;
        for achievement in &new_achievements {
            self.progress
                .add_points(
                    user_id,
                    achievement.points,
                    &format!("achievement: {}", achievement.id),
                )
                .await?;
            points_awarded += achievement.points;
            info!(user = user_id, id = %achievement.id, points = achievement.points, "achievement unlocked");
        }

        Ok(PracticeOutcome {
            session,
            streak: update.streak,
            new_milestones: update.new_milestones,
            new_achievements,
            points_awarded,
        })
    }

    /// Evaluate the catalog and persist any new unlocks.
    ///
    /// The unlock write is the idempotency gate: an achievement is only
    /// reported (and worth points) when the store confirms it was new.
    async fn evaluate_achievements(
        &self,
        user_id: &str,
        sessions: &[PracticeSession],
        current_streak: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Achievement>> {
        let wish_count = self.storage.wish_count(user_id).await?;
        let total_practices = self.storage.session_count(user_id).await?;
        let daily_totals: BTreeMap<NaiveDate, u32> = streak::daily_totals(sessions);

        let already_unlocked: HashSet<String> = self
            .progress
            .list_achievements(user_id)
            .await?
            .into_iter()
            .filter(|a| a.unlocked)
            .map(|a| a.id)
            .collect();

        let input = EvaluationInput {
            wish_count,
            total_practices,
            current_streak,
            daily_totals: &daily_totals,
            today,
        };
        let candidates = achievements::evaluate(&input, &already_unlocked, now);

        let mut unlocked = Vec::new();
        for achievement in candidates {
            if self
                .progress
                .unlock_achievement(user_id, &achievement.id, now)
                .await?
            {
                unlocked.push(achievement);
            }
        }
        Ok(unlocked)
    }

    /// Current streak standing plus today's progress toward the 18 units.
    ///
    /// The current streak is re-derived from session history so a stored
    /// value left behind by an old practice never over-reports; milestones
    /// stay as persisted.
    pub async fn status(&self, user_id: &str, today: NaiveDate) -> Result<StatusReport> {
        let mut streak = self.progress.get_streak(user_id).await?;
        let sessions = self.storage.list_sessions(user_id).await?;
        streak.current_streak = streak::current_streak(&sessions, today);
        streak.longest_streak = streak.longest_streak.max(streak.current_streak);
        let today_units: u32 = sessions
            .iter()
            .filter(|s| s.date == today)
            .map(|s| s.completed_count)
            .sum();
        let total_points = self.progress.total_points(user_id).await?;
        Ok(StatusReport {
            streak,
            today_units,
            today_completed: today_units >= DAILY_TARGET,
            total_points,
        })
    }

    /// The achievement catalog with this user's unlock state.
    pub async fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        self.progress.list_achievements(user_id).await
    }

    /// Derive the analytics view for the window ending at `today`.
    pub async fn analytics(
        &self,
        user_id: &str,
        window: LookbackWindow,
        today: NaiveDate,
    ) -> Result<AnalyticsData> {
        let sessions = match today.checked_sub_days(Days::new(window.days() as u64)) {
            Some(since) => self.storage.list_sessions_since(user_id, since).await?,
            None => self.storage.list_sessions(user_id).await?,
        };
        let wishes = self.storage.list_wishes(user_id, true).await?;
        Ok(analytics::aggregate(&sessions, &wishes, window, today))
    }

    /// Generate insight suggestions from the analytics view.
    pub async fn insights(
        &self,
        user_id: &str,
        window: LookbackWindow,
        today: NaiveDate,
    ) -> Result<Vec<PracticeInsight>> {
        let data = self.analytics(user_id, window, today).await?;
        Ok(analytics::insights::generate(&data))
    }

    // ─── Wish management passthroughs ───────────────────────────────────────

    pub async fn create_wish(
        &self,
        user_id: &str,
        title: &str,
        affirmation: &str,
        category: WishCategory,
        now: DateTime<Utc>,
    ) -> Result<Wish> {
        let wish = self
            .storage
            .create_wish(user_id, title, affirmation, category, now)
            .await?;
        info!(user = user_id, wish = %wish.id, "wish created");
        Ok(wish)
    }

    pub async fn list_wishes(&self, user_id: &str, include_archived: bool) -> Result<Vec<Wish>> {
        self.storage.list_wishes(user_id, include_archived).await
    }

    pub async fn archive_wish(&self, id: &str) -> Result<()> {
        self.storage.archive_wish(id).await?;
        info!(wish = id, "wish archived");
        Ok(())
    }

    pub async fn delete_wish(&self, id: &str) -> Result<()> {
        self.storage.delete_wish(id).await?;
        info!(wish = id, "wish deleted");
        Ok(())
    }
}
