// SPDX-License-Identifier: MIT
//! Streak calculator — derives current/longest streak and milestone unlocks
//! from recorded practice sessions.
//!
//! A streak is a property of the set of *completed calendar days* (each day
//! independently summing ≥ 18 units across its slots), scanned backward from
//! the most recent completed day. Session `date` is authoritative — wall
//! clock never enters the computation, so backfilled days extend or join
//! runs instead of corrupting them. Callers pass `today` and `now`
//! explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::model::{Milestone, PracticeSession, StreakDay, UserStreak, DAILY_TARGET};

/// Fixed milestone thresholds, ascending.
pub const MILESTONE_DAYS: [u32; 6] = [3, 7, 21, 30, 60, 100];

/// Days of history retained in `UserStreak::streak_history`.
const HISTORY_LIMIT: usize = 100;

/// Reward label for a milestone threshold.
pub fn milestone_reward(days: u32) -> &'static str {
    match days {
        3 => "Spark badge",
        7 => "Week flame badge",
        21 => "Habit forger badge",
        30 => "Moon cycle badge",
        60 => "Deep current badge",
        100 => "Centenary crown",
        _ => "Milestone badge",
    }
}

/// Points credited to the ledger when a milestone unlocks.
pub fn milestone_points(days: u32) -> u32 {
    days * 5
}

/// Fresh milestone list with nothing achieved.
pub fn default_milestones() -> Vec<Milestone> {
    MILESTONE_DAYS
        .iter()
        .map(|&days| Milestone {
            days,
            achieved: false,
            achieved_date: None,
            reward: milestone_reward(days).to_string(),
        })
        .collect()
}

/// Result of a streak recompute.
#[derive(Debug, Clone)]
pub struct StreakUpdate {
    pub streak: UserStreak,
    /// Milestones that flipped to achieved during this recompute, ascending
    /// by threshold. Callers notify the user for each of these.
    pub new_milestones: Vec<Milestone>,
}

/// Sum completed units per calendar day.
pub fn daily_totals(sessions: &[PracticeSession]) -> BTreeMap<NaiveDate, u32> {
    let mut totals: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for s in sessions {
        *totals.entry(s.date).or_insert(0) += s.completed_count;
    }
    totals
}

/// Recompute streak state from the full session history.
///
/// `previous` supplies the monotonic parts (longest streak, achieved
/// milestones); everything else is derived from `sessions` alone, so the
/// function is idempotent — feeding the same history twice changes nothing.
pub fn recompute(
    previous: &UserStreak,
    sessions: &[PracticeSession],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> StreakUpdate {
    let totals = daily_totals(sessions);
    let completed_days: Vec<NaiveDate> = totals
        .iter()
        .filter(|(_, &units)| units >= DAILY_TARGET)
        .map(|(&day, _)| day)
        .collect();

    let current_streak = current_run(&completed_days, today);
    let longest_run = longest_run(&completed_days);
    let longest_streak = previous
        .longest_streak
        .max(longest_run)
        .max(current_streak);

    let last_practice_date = completed_days.last().copied();

    // History keeps the most recent 100 practiced days, oldest first.
    let mut streak_history: Vec<StreakDay> = totals
        .iter()
        .map(|(&date, &practice_count)| StreakDay {
            date,
            practice_count,
            completed: practice_count >= DAILY_TARGET,
        })
        .collect();
    if streak_history.len() > HISTORY_LIMIT {
        streak_history.drain(..streak_history.len() - HISTORY_LIMIT);
    }

    let mut milestones = if previous.milestones.is_empty() {
        default_milestones()
    } else {
        previous.milestones.clone()
    };

    // All thresholds ≤ current_streak unlock together on first crossing;
    // achieved flags never revert.
    let mut new_milestones = Vec::new();
    for m in milestones.iter_mut() {
        if !m.achieved && current_streak >= m.days {
            m.achieved = true;
            m.achieved_date = Some(now);
            new_milestones.push(m.clone());
        }
    }

    StreakUpdate {
        streak: UserStreak {
            current_streak,
            longest_streak,
            last_practice_date,
            streak_history,
            milestones,
        },
        new_milestones,
    }
}

/// Current streak length derived directly from session history, without
/// touching milestone state. Read paths use this so a stored streak that
/// has gone stale never over-reports.
pub fn current_streak(sessions: &[PracticeSession], today: NaiveDate) -> u32 {
    let totals = daily_totals(sessions);
    let completed_days: Vec<NaiveDate> = totals
        .iter()
        .filter(|(_, &units)| units >= DAILY_TARGET)
        .map(|(&day, _)| day)
        .collect();
    current_run(&completed_days, today)
}

/// Length of the backward run ending at the most recent completed day,
/// provided that run is still alive (ends today or yesterday).
fn current_run(completed_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&last) = completed_days.last() else {
        return 0;
    };
    if today.signed_duration_since(last).num_days() > 1 {
        return 0;
    }
    let mut run = 1u32;
    for pair in completed_days.windows(2).rev() {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            run += 1;
        } else {
            break;
        }
    }
    run
}

/// Longest run of consecutive completed days anywhere in history.
fn longest_run(completed_days: &[NaiveDate]) -> u32 {
    if completed_days.is_empty() {
        return 0;
    }
    let mut best = 1u32;
    let mut run = 1u32;
    for pair in completed_days.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best
}

// ─── Tests ────────────────────────────────────────────────────────────────────
