// SPDX-License-Identifier: MIT
//! Analytics data models — serialisable derived views over practice history.

use serde::{Deserialize, Serialize};

use crate::model::TimeSlot;

// ─── Daily Count ──────────────────────────────────────────────────────────────

/// A (bucket, count) pair used in time-series data. The bucket label is an
/// ISO 8601 date (`"2026-02-25"`), an ISO week (`"2026-W09"`), or a month
/// (`"2026-02"`) depending on the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

// ─── Frequency ────────────────────────────────────────────────────────────────

/// Session counts bucketed three ways, each ascending by bucket label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyBuckets {
    pub daily: Vec<DailyCount>,
    pub weekly: Vec<DailyCount>,
    pub monthly: Vec<DailyCount>,
}

// ─── Time of day ──────────────────────────────────────────────────────────────

/// Session counts per writing slot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeOfDayBreakdown {
    pub morning: u64,
    pub afternoon: u64,
    pub evening: u64,
}

impl TimeOfDayBreakdown {
    /// The slot holding a strict majority of sessions, if any slot does.
    pub fn dominant(&self) -> Option<TimeSlot> {
        let total = self.morning + self.afternoon + self.evening;
        if total == 0 {
            return None;
        }
        let candidates = [
            (TimeSlot::Morning, self.morning),
            (TimeSlot::Afternoon, self.afternoon),
            (TimeSlot::Evening, self.evening),
        ];
        candidates
            .into_iter()
            .find(|&(_, n)| n * 2 > total)
            .map(|(slot, _)| slot)
    }
}

// ─── Mood ─────────────────────────────────────────────────────────────────────

/// Session counts per reported mood. Sessions without a mood are not counted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MoodBreakdown {
    pub excellent: u64,
    pub good: u64,
    pub neutral: u64,
    pub poor: u64,
}

impl MoodBreakdown {
    pub fn total(&self) -> u64 {
        self.excellent + self.good + self.neutral + self.poor
    }

    /// Share of mood-carrying sessions reported as excellent or good.
    /// `None` when no session carried a mood.
    pub fn positive_ratio(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some((self.excellent + self.good) as f64 / total as f64)
    }
}

// ─── Per-wish completion ──────────────────────────────────────────────────────

/// Completion summary for one wish inside the lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishCompletion {
    pub wish_id: String,
    pub title: String,
    pub completed_units: u64,
    pub target_units: u64,
    /// `completed_units / target_units`, clamped to [0, 1].
    pub completion_rate: f64,
}

// ─── Top-level view ───────────────────────────────────────────────────────────

/// The full derived analytics view. Recomputed from the session list on
/// every call; feeding the same inputs yields an identical value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub window_days: u32,
    pub session_count: u64,
    pub frequency: FrequencyBuckets,
    pub time_of_day: TimeOfDayBreakdown,
    pub moods: MoodBreakdown,
    /// Ranked descending by completion rate.
    pub wish_completion: Vec<WishCompletion>,
    /// Distinct calendar days with any practice in the window.
    pub active_days: u32,
    /// `active_days / window_days`, clamped to [0, 1].
    pub consistency: f64,
    /// Weighted 0–100 score: completion 50%, consistency 30%, mood 20%.
    pub productivity_score: f64,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
