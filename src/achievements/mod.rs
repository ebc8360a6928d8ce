// SPDX-License-Identifier: MIT
//! Achievement system — fixed badge catalog, typed unlock conditions, and
//! the pure evaluator that decides which badges a user has newly earned.
//!
//! Achievement IDs are snake_case strings (e.g. `"week_warrior"`) and are
//! stable across versions. Unlocking is monotonic: the evaluator only ever
//! reports ids absent from the already-unlocked set, and the progress store
//! ignores duplicate unlocks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::model::{Achievement, DAILY_TARGET};

// ─── Achievement ID constants ─────────────────────────────────────────────────

pub const FIRST_WISH: &str = "first_wish";
pub const DREAM_COLLECTOR: &str = "dream_collector";
pub const FIRST_PRACTICE: &str = "first_practice";
pub const PRACTICE_MASTER: &str = "practice_master";
pub const WEEK_WARRIOR: &str = "week_warrior";
pub const DAILY_DEVOTEE: &str = "daily_devotee";
pub const PERFECT_WEEK: &str = "perfect_week";

/// Days of aggregates the windowed conditions may look back over.
const CONDITION_WINDOW_DAYS: i64 = 30;

// ─── Conditions ───────────────────────────────────────────────────────────────

/// Typed unlock condition. One variant per condition kind so evaluation is
/// exhaustive — adding a variant without an evaluator arm fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Total wishes the user has created (archived ones included).
    WishCreated { count: u64 },
    /// Current streak length in days.
    Streak { days: u32 },
    /// Total practice sessions ever recorded.
    TotalPractices { count: u64 },
    /// Consecutive days reaching the 18-unit daily goal, ending today or
    /// yesterday.
    DailyGoal { days: u32 },
    /// Seven consecutive completed days anywhere in the trailing window.
    PerfectWeek,
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// One catalog entry. The catalog is the canonical source of truth for the
/// badge list; clients render it with unlock state joined in.
#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: Condition,
    pub points: u32,
    pub feature_unlock: Option<&'static str>,
}

/// Return all defined achievements in display order.
pub fn catalog() -> Vec<AchievementDef> {
    vec![
        AchievementDef {
            id: FIRST_WISH,
            name: "First Wish",
            description: "Wrote down your first wish. The journey begins.",
            condition: Condition::WishCreated { count: 1 },
            points: 10,
            feature_unlock: None,
        },
        AchievementDef {
            id: DREAM_COLLECTOR,
            name: "Dream Collector",
            description: "Five wishes in your journal.",
            condition: Condition::WishCreated { count: 5 },
            points: 25,
            feature_unlock: None,
        },
        AchievementDef {
            id: FIRST_PRACTICE,
            name: "First Practice",
            description: "Completed your first writing session.",
            condition: Condition::TotalPractices { count: 1 },
            points: 10,
            feature_unlock: None,
        },
        AchievementDef {
            id: PRACTICE_MASTER,
            name: "Practice Master",
            description: "100 practice sessions recorded.",
            condition: Condition::TotalPractices { count: 100 },
            points: 100,
            feature_unlock: Some("golden journal theme"),
        },
        AchievementDef {
            id: WEEK_WARRIOR,
            name: "Week Warrior",
            description: "A seven-day practice streak.",
            condition: Condition::Streak { days: 7 },
            points: 50,
            feature_unlock: None,
        },
        AchievementDef {
            id: DAILY_DEVOTEE,
            name: "Daily Devotee",
            description: "Hit the 18-unit daily goal three days in a row.",
            condition: Condition::DailyGoal { days: 3 },
            points: 30,
            feature_unlock: None,
        },
        AchievementDef {
            id: PERFECT_WEEK,
            name: "Perfect Week",
            description: "Seven consecutive days, each reaching all 18 units.",
            condition: Condition::PerfectWeek,
            points: 75,
            feature_unlock: Some("aurora card frame"),
        },
    ]
}

// ─── Evaluation ───────────────────────────────────────────────────────────────

/// Aggregated user activity the evaluator runs against. All fields are
/// derived by the caller; the evaluator itself reads nothing.
#[derive(Debug, Clone)]
pub struct EvaluationInput<'a> {
    pub wish_count: u64,
    pub total_practices: u64,
    pub current_streak: u32,
    /// Completed units per calendar day (see `streak::daily_totals`). Only
    /// the trailing 30 days relative to `today` are consulted.
    pub daily_totals: &'a BTreeMap<NaiveDate, u32>,
    pub today: NaiveDate,
}

/// Evaluate the catalog against `input`, skipping ids in `already_unlocked`,
/// and return the newly earned achievements stamped with `now`.
///
/// Re-evaluating with a superset of the same data is a no-op for anything
/// already in `already_unlocked`.
pub fn evaluate(
    input: &EvaluationInput<'_>,
    already_unlocked: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    catalog()
        .into_iter()
        .filter(|def| !already_unlocked.contains(def.id))
        .filter(|def| condition_met(&def.condition, input))
        .map(|def| Achievement {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            points: def.points,
            feature_unlock: def.feature_unlock.map(str::to_string),
            unlocked: true,
            unlocked_at: Some(now),
        })
        .collect()
}

fn condition_met(condition: &Condition, input: &EvaluationInput<'_>) -> bool {
    match condition {
        Condition::WishCreated { count } => input.wish_count >= *count,
        Condition::Streak { days } => input.current_streak >= *days,
        Condition::TotalPractices { count } => input.total_practices >= *count,
        Condition::DailyGoal { days } => trailing_goal_run(input) >= *days,
        Condition::PerfectWeek => best_windowed_run(input) >= 7,
    }
}

/// Whether `date` reached the daily goal, within the trailing window.
fn goal_day(input: &EvaluationInput<'_>, date: NaiveDate) -> bool {
    if input.today.signed_duration_since(date).num_days() >= CONDITION_WINDOW_DAYS {
        return false;
    }
    input
        .daily_totals
        .get(&date)
        .map(|&units| units >= DAILY_TARGET)
        .unwrap_or(false)
}

/// Consecutive goal days ending today (or yesterday, when today is still in
/// progress).
fn trailing_goal_run(input: &EvaluationInput<'_>) -> u32 {
    let mut cursor = if goal_day(input, input.today) {
        input.today
    } else {
        match input.today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };
    let mut run = 0u32;
    while goal_day(input, cursor) {
        run += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    run
}

/// Longest run of consecutive goal days anywhere in the trailing window.
fn best_windowed_run(input: &EvaluationInput<'_>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for (&date, &units) in input.daily_totals {
        if units < DAILY_TARGET
            || input.today.signed_duration_since(date).num_days() >= CONDITION_WINDOW_DAYS
        {
            prev = None;
            run = 0;
            continue;
        }
        run = match prev {
            Some(p) if date.signed_duration_since(p).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input<'a>(
        wishes: u64,
        practices: u64,
        streak: u32,
        totals: &'a BTreeMap<NaiveDate, u32>,
        today: NaiveDate,
    ) -> EvaluationInput<'a> {
        EvaluationInput {
            wish_count: wishes,
            total_practices: practices,
            current_streak: streak,
            daily_totals: totals,
            today,
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let defs = catalog();
        let ids: HashSet<&str> = defs.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn no_activity_unlocks_nothing() {
        let totals = BTreeMap::new();
        let got = evaluate(
            &input(0, 0, 0, &totals, day(2026, 3, 10)),
            &HashSet::new(),
            Utc::now(),
        );
        assert!(got.is_empty());
    }

    #[test]
    fn first_wish_and_practice_unlock_together() {
        let mut totals = BTreeMap::new();
        totals.insert(day(2026, 3, 10), 3);
        let got = evaluate(
            &input(1, 1, 0, &totals, day(2026, 3, 10)),
            &HashSet::new(),
            Utc::now(),
        );
        let ids: Vec<&str> = got.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![FIRST_WISH, FIRST_PRACTICE]);
        assert!(got.iter().all(|a| a.unlocked && a.unlocked_at.is_some()));
    }

    #[test]
    fn already_unlocked_ids_are_skipped() {
        let mut totals = BTreeMap::new();
        totals.insert(day(2026, 3, 10), 18);
        let mut unlocked = HashSet::new();
        unlocked.insert(FIRST_WISH.to_string());
        unlocked.insert(FIRST_PRACTICE.to_string());
        let got = evaluate(
            &input(1, 1, 0, &totals, day(2026, 3, 10)),
            &unlocked,
            Utc::now(),
        );
        assert!(got.is_empty());
    }

    #[test]
    fn practice_master_needs_one_hundred() {
        let totals = BTreeMap::new();
        let today = day(2026, 3, 10);
        let at_99 = evaluate(&input(0, 99, 0, &totals, today), &HashSet::new(), Utc::now());
        assert!(!at_99.iter().any(|a| a.id == PRACTICE_MASTER));

        let at_100 = evaluate(&input(0, 100, 0, &totals, today), &HashSet::new(), Utc::now());
        let master = at_100.iter().find(|a| a.id == PRACTICE_MASTER).unwrap();
        assert_eq!(master.points, 100);
        assert_eq!(master.feature_unlock.as_deref(), Some("golden journal theme"));
    }

    #[test]
    fn week_warrior_follows_current_streak() {
        let totals = BTreeMap::new();
        let today = day(2026, 3, 10);
        let at_6 = evaluate(&input(0, 0, 6, &totals, today), &HashSet::new(), Utc::now());
        assert!(!at_6.iter().any(|a| a.id == WEEK_WARRIOR));

        let at_7 = evaluate(&input(0, 0, 7, &totals, today), &HashSet::new(), Utc::now());
        assert!(at_7.iter().any(|a| a.id == WEEK_WARRIOR));
    }

    #[test]
    fn daily_devotee_counts_a_trailing_run() {
        let today = day(2026, 3, 10);
        let mut totals = BTreeMap::new();
        for d in 8..=10 {
            totals.insert(day(2026, 3, d), 18);
        }
        let got = evaluate(&input(0, 0, 0, &totals, today), &HashSet::new(), Utc::now());
        assert!(got.iter().any(|a| a.id == DAILY_DEVOTEE));
    }

    #[test]
    fn daily_devotee_run_may_end_yesterday() {
        let today = day(2026, 3, 11);
        let mut totals = BTreeMap::new();
        for d in 8..=10 {
            totals.insert(day(2026, 3, d), 18);
        }
        // Nothing logged today yet; the run through yesterday still counts.
        let got = evaluate(&input(0, 0, 0, &totals, today), &HashSet::new(), Utc::now());
        assert!(got.iter().any(|a| a.id == DAILY_DEVOTEE));
    }

    #[test]
    fn perfect_week_needs_seven_consecutive_inside_window() {
        let today = day(2026, 3, 20);
        let mut totals = BTreeMap::new();
        for d in 5..=11 {
            totals.insert(day(2026, 3, d), 18);
        }
        let got = evaluate(&input(0, 0, 0, &totals, today), &HashSet::new(), Utc::now());
        assert!(got.iter().any(|a| a.id == PERFECT_WEEK));

        // A broken run of 6 + 1 does not qualify.
        let mut broken = BTreeMap::new();
        for d in 5..=10 {
            broken.insert(day(2026, 3, d), 18);
        }
        broken.insert(day(2026, 3, 12), 18);
        let got = evaluate(&input(0, 0, 0, &broken, today), &HashSet::new(), Utc::now());
        assert!(!got.iter().any(|a| a.id == PERFECT_WEEK));
    }

    #[test]
    fn perfect_week_ignores_days_outside_the_window() {
        let today = day(2026, 6, 1);
        let mut totals = BTreeMap::new();
        for d in 1..=7 {
            totals.insert(day(2026, 3, d), 18);
        }
        let got = evaluate(&input(0, 0, 0, &totals, today), &HashSet::new(), Utc::now());
        assert!(!got.iter().any(|a| a.id == PERFECT_WEEK));
    }
}
