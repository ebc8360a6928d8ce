// SPDX-License-Identifier: MIT
//! Analytics aggregator — pure derivations over a user's practice history.
//!
//! Every function here recomputes from the session list it is handed;
//! there is no cache and no hidden state, so identical inputs always
//! produce identical output. Lookback windows are calendar-day based and
//! anchored on an explicit `today`.

pub mod insights;
pub mod model;

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::model::{Mood, PracticeSession, TimeSlot, Wish};
use model::{
    AnalyticsData, DailyCount, FrequencyBuckets, MoodBreakdown, TimeOfDayBreakdown,
    WishCompletion,
};

// ─── Lookback window ──────────────────────────────────────────────────────────

/// Supported lookback windows for analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackWindow {
    Days30,
    Days90,
    Days365,
}

impl LookbackWindow {
    pub fn days(&self) -> u32 {
        match self {
            LookbackWindow::Days30 => 30,
            LookbackWindow::Days90 => 90,
            LookbackWindow::Days365 => 365,
        }
    }
}

impl std::str::FromStr for LookbackWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30" => Ok(LookbackWindow::Days30),
            "90" => Ok(LookbackWindow::Days90),
            "365" => Ok(LookbackWindow::Days365),
            other => Err(format!("unsupported window: {other} (use 30, 90, or 365)")),
        }
    }
}

// ─── Aggregation ──────────────────────────────────────────────────────────────

/// Derive the full analytics view for one user's sessions.
///
/// Sessions dated after `today` or before the window are ignored. Sessions
/// without a mood are skipped by the mood breakdown; sessions referencing a
/// wish absent from `wishes` are skipped by the completion ranking. Neither
/// is an error.
pub fn aggregate(
    sessions: &[PracticeSession],
    wishes: &[Wish],
    window: LookbackWindow,
    today: NaiveDate,
) -> AnalyticsData {
    let days = window.days();
    let in_window: Vec<&PracticeSession> = sessions
        .iter()
        .filter(|s| {
            let age = today.signed_duration_since(s.date).num_days();
            age >= 0 && age < days as i64
        })
        .collect();

    // Frequency buckets, keyed for deterministic ascending order.
    let mut daily: BTreeMap<String, u64> = BTreeMap::new();
    let mut weekly: BTreeMap<String, u64> = BTreeMap::new();
    let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
    let mut time_of_day = TimeOfDayBreakdown::default();
    let mut moods = MoodBreakdown::default();
    let mut distinct_days: BTreeMap<NaiveDate, ()> = BTreeMap::new();
    let mut completed_total = 0u64;
    let mut target_total = 0u64;
    let mut mood_score_sum = 0u64;
    let mut mood_count = 0u64;

    for s in &in_window {
        *daily.entry(s.date.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
        let week = s.date.iso_week();
        *weekly
            .entry(format!("{}-W{:02}", week.year(), week.week()))
            .or_insert(0) += 1;
        *monthly.entry(s.date.format("%Y-%m").to_string()).or_insert(0) += 1;

        match s.time_slot {
            TimeSlot::Morning => time_of_day.morning += 1,
            TimeSlot::Afternoon => time_of_day.afternoon += 1,
            TimeSlot::Evening => time_of_day.evening += 1,
        }

        match s.mood {
            Some(Mood::Excellent) => moods.excellent += 1,
            Some(Mood::Good) => moods.good += 1,
            Some(Mood::Neutral) => moods.neutral += 1,
            Some(Mood::Poor) => moods.poor += 1,
            None => {}
        }
        if let Some(m) = s.mood {
            mood_score_sum += m.score() as u64;
            mood_count += 1;
        }

        distinct_days.insert(s.date, ());
        completed_total += s.completed_count as u64;
        target_total += s.target_count as u64;
    }

    let wish_completion = rank_wishes(&in_window, wishes);

    let active_days = distinct_days.len() as u32;
    let consistency = (active_days as f64 / days as f64).clamp(0.0, 1.0);
    let completion_rate = if target_total > 0 {
        (completed_total as f64 / target_total as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mood_component = if mood_count > 0 {
        (mood_score_sum as f64 / mood_count as f64) / 100.0
    } else {
        0.0
    };
    let productivity_score =
        ((completion_rate * 0.5 + consistency * 0.3 + mood_component * 0.2) * 100.0)
            .clamp(0.0, 100.0);

    AnalyticsData {
        window_days: days,
        session_count: in_window.len() as u64,
        frequency: FrequencyBuckets {
            daily: to_counts(daily),
            weekly: to_counts(weekly),
            monthly: to_counts(monthly),
        },
        time_of_day,
        moods,
        wish_completion,
        active_days,
        consistency,
        productivity_score,
    }
}

fn to_counts(buckets: BTreeMap<String, u64>) -> Vec<DailyCount> {
    buckets
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Per-wish completion summary, ranked by completion rate descending with
/// the wish title as tiebreaker.
fn rank_wishes(sessions: &[&PracticeSession], wishes: &[Wish]) -> Vec<WishCompletion> {
    let titles: BTreeMap<&str, &str> = wishes
        .iter()
        .map(|w| (w.id.as_str(), w.title.as_str()))
        .collect();

    let mut per_wish: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for s in sessions {
        let entry = per_wish.entry(s.wish_id.as_str()).or_insert((0, 0));
        entry.0 += s.completed_count as u64;
        entry.1 += s.target_count as u64;
    }

    let mut ranked: Vec<WishCompletion> = per_wish
        .into_iter()
        .filter_map(|(wish_id, (completed_units, target_units))| {
            let title = titles.get(wish_id)?;
            let completion_rate = if target_units > 0 {
                (completed_units as f64 / target_units as f64).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(WishCompletion {
                wish_id: wish_id.to_string(),
                title: (*title).to_string(),
                completed_units,
                target_units,
                completion_rate,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WishCategory;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wish(id: &str, title: &str) -> Wish {
        Wish {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: title.to_string(),
            affirmation: String::new(),
            category: WishCategory::Personal,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn session(
        wish_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        completed: u32,
        mood: Option<Mood>,
    ) -> PracticeSession {
        PracticeSession {
            id: uuid::Uuid::new_v4().to_string(),
            wish_id: wish_id.to_string(),
            user_id: "u1".to_string(),
            date,
            time_slot: slot,
            completed_count: completed,
            target_count: slot.target_count(),
            mood,
            affirmation_text: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_zeroed_view() {
        let data = aggregate(&[], &[], LookbackWindow::Days30, day(2026, 3, 10));
        assert_eq!(data.session_count, 0);
        assert_eq!(data.active_days, 0);
        assert_eq!(data.consistency, 0.0);
        assert_eq!(data.productivity_score, 0.0);
        assert!(data.wish_completion.is_empty());
    }

    #[test]
    fn sessions_outside_the_window_are_ignored() {
        let today = day(2026, 3, 10);
        let sessions = vec![
            session("w1", day(2026, 3, 9), TimeSlot::Morning, 3, None),
            session("w1", day(2025, 1, 1), TimeSlot::Morning, 3, None),
            // Future-dated entries never count.
            session("w1", day(2026, 4, 1), TimeSlot::Morning, 3, None),
        ];
        let data = aggregate(&sessions, &[wish("w1", "Calm")], LookbackWindow::Days30, today);
        assert_eq!(data.session_count, 1);
        assert_eq!(data.frequency.daily, vec![DailyCount { date: "2026-03-09".to_string(), count: 1 }]);
    }

    #[test]
    fn buckets_and_breakdowns_count_correctly() {
        let today = day(2026, 3, 10);
        let sessions = vec![
            session("w1", day(2026, 3, 9), TimeSlot::Morning, 3, Some(Mood::Good)),
            session("w1", day(2026, 3, 9), TimeSlot::Evening, 9, Some(Mood::Excellent)),
            session("w1", day(2026, 3, 10), TimeSlot::Evening, 9, None),
        ];
        let data = aggregate(&sessions, &[wish("w1", "Calm")], LookbackWindow::Days30, today);
        assert_eq!(data.session_count, 3);
        assert_eq!(data.time_of_day.evening, 2);
        assert_eq!(data.moods.total(), 2);
        assert_eq!(data.active_days, 2);
        assert_eq!(data.frequency.monthly, vec![DailyCount { date: "2026-03".to_string(), count: 3 }]);
    }

    #[test]
    fn wish_ranking_orders_by_completion_rate() {
        let today = day(2026, 3, 10);
        let sessions = vec![
            session("w1", day(2026, 3, 9), TimeSlot::Evening, 9, None),
            session("w2", day(2026, 3, 9), TimeSlot::Evening, 3, None),
        ];
        let wishes = vec![wish("w1", "Full"), wish("w2", "Partial")];
        let data = aggregate(&sessions, &wishes, LookbackWindow::Days30, today);
        assert_eq!(data.wish_completion.len(), 2);
        assert_eq!(data.wish_completion[0].wish_id, "w1");
        assert!((data.wish_completion[0].completion_rate - 1.0).abs() < 1e-9);
        assert!((data.wish_completion[1].completion_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn orphan_sessions_are_skipped_from_ranking() {
        let today = day(2026, 3, 10);
        let sessions = vec![session("ghost", day(2026, 3, 9), TimeSlot::Morning, 3, None)];
        let data = aggregate(&sessions, &[], LookbackWindow::Days30, today);
        assert!(data.wish_completion.is_empty());
        // The session still counts toward frequency and consistency.
        assert_eq!(data.session_count, 1);
        assert_eq!(data.active_days, 1);
    }

    #[test]
    fn over_completion_cannot_push_score_past_one_hundred() {
        let today = day(2026, 3, 30);
        // 30 days of over-achieving, all excellent.
        let mut sessions = Vec::new();
        for d in 1..=30 {
            for slot in TimeSlot::all() {
                sessions.push(session(
                    "w1",
                    day(2026, 3, d),
                    slot,
                    slot.target_count() * 10,
                    Some(Mood::Excellent),
                ));
            }
        }
        let data = aggregate(&sessions, &[wish("w1", "Max")], LookbackWindow::Days30, today);
        assert!(data.productivity_score <= 100.0);
        assert!(data.productivity_score >= 99.9);
        assert!(data.consistency <= 1.0);
    }

    #[test]
    fn aggregation_is_pure() {
        let today = day(2026, 3, 10);
        let sessions = vec![
            session("w1", day(2026, 3, 9), TimeSlot::Morning, 3, Some(Mood::Neutral)),
            session("w1", day(2026, 3, 10), TimeSlot::Evening, 9, None),
        ];
        let wishes = vec![wish("w1", "Calm")];
        let a = aggregate(&sessions, &wishes, LookbackWindow::Days30, today);
        let b = aggregate(&sessions, &wishes, LookbackWindow::Days30, today);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
