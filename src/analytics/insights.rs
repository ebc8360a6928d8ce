// SPDX-License-Identifier: MIT
//! Insight generator — turns an [`AnalyticsData`] view into short,
//! human-readable suggestions for the presentation layer.
//!
//! Each rule is a plain threshold check over the already-aggregated data.
//! Rules fire independently; there is no ordering dependency between them
//! beyond the order of the returned list.

use serde::{Deserialize, Serialize};

use super::model::AnalyticsData;
use crate::model::TimeSlot;

/// Consistency below this ratio draws a warning.
const CONSISTENCY_FLOOR: f64 = 0.7;
/// Positive-mood ratio above this draws a success note.
const POSITIVE_MOOD_BAR: f64 = 0.8;
/// Productivity score bands.
const PRODUCTIVITY_HIGH: f64 = 80.0;
const PRODUCTIVITY_LOW: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Info,
    Success,
    Warning,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Info => "info",
            InsightKind::Success => "success",
            InsightKind::Warning => "warning",
        }
    }
}

/// One generated suggestion. The message is presentation-ready text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeInsight {
    pub kind: InsightKind,
    pub message: String,
}

impl PracticeInsight {
    fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Run every rule against `data` and collect the insights that fired.
///
/// A window with no sessions produces no insights — there is nothing to
/// advise on yet.
pub fn generate(data: &AnalyticsData) -> Vec<PracticeInsight> {
    let mut insights = Vec::new();
    if data.session_count == 0 {
        return insights;
    }

    if data.consistency < CONSISTENCY_FLOOR {
        insights.push(PracticeInsight::new(
            InsightKind::Warning,
            format!(
                "You practiced on {} of the last {} days. Daily repetition is \
                 what makes the 369 method stick — try not to let days slip by.",
                data.active_days, data.window_days
            ),
        ));
    }

    if let Some(slot) = data.time_of_day.dominant() {
        let when = match slot {
            TimeSlot::Morning => "in the morning",
            TimeSlot::Afternoon => "in the afternoon",
            TimeSlot::Evening => "in the evening",
        };
        insights.push(PracticeInsight::new(
            InsightKind::Info,
            format!("Most of your writing happens {when}. Anchoring practice to a fixed time of day strengthens the habit."),
        ));
    }

    if let Some(ratio) = data.moods.positive_ratio() {
        if ratio > POSITIVE_MOOD_BAR {
            insights.push(PracticeInsight::new(
                InsightKind::Success,
                "Your mood during practice has been overwhelmingly positive. Keep riding that energy.",
            ));
        }
    }

    if data.productivity_score > PRODUCTIVITY_HIGH {
        insights.push(PracticeInsight::new(
            InsightKind::Success,
            format!(
                "Productivity score {:.0}/100 — you are practicing consistently and completing your repetitions.",
                data.productivity_score
            ),
        ));
    } else if data.productivity_score < PRODUCTIVITY_LOW {
        insights.push(PracticeInsight::new(
            InsightKind::Warning,
            format!(
                "Productivity score {:.0}/100. Shorter but complete sessions beat sporadic bursts — aim for all 18 units on the days you do practice.",
                data.productivity_score
            ),
        ));
    }

    insights
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::model::{MoodBreakdown, TimeOfDayBreakdown};

    fn base(session_count: u64) -> AnalyticsData {
        AnalyticsData {
            window_days: 30,
            session_count,
            ..Default::default()
        }
    }

    #[test]
    fn empty_window_generates_nothing() {
        assert!(generate(&base(0)).is_empty());
    }

    #[test]
    fn low_consistency_warns() {
        let mut data = base(4);
        data.active_days = 4;
        data.consistency = 4.0 / 30.0;
        let insights = generate(&data);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Warning && i.message.contains("4 of the last 30")));
    }

    #[test]
    fn high_consistency_does_not_warn() {
        let mut data = base(60);
        data.active_days = 28;
        data.consistency = 28.0 / 30.0;
        data.productivity_score = 70.0;
        let insights = generate(&data);
        assert!(insights.iter().all(|i| i.kind != InsightKind::Warning));
    }

    #[test]
    fn dominant_slot_produces_info() {
        let mut data = base(10);
        data.consistency = 0.9;
        data.productivity_score = 70.0;
        data.time_of_day = TimeOfDayBreakdown {
            morning: 1,
            afternoon: 1,
            evening: 8,
        };
        let insights = generate(&data);
        let info = insights.iter().find(|i| i.kind == InsightKind::Info).unwrap();
        assert!(info.message.contains("in the evening"));
    }

    #[test]
    fn positive_mood_and_high_score_succeed() {
        let mut data = base(10);
        data.consistency = 0.9;
        data.productivity_score = 92.0;
        data.moods = MoodBreakdown {
            excellent: 7,
            good: 2,
            neutral: 1,
            poor: 0,
        };
        let insights = generate(&data);
        let successes = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Success)
            .count();
        assert_eq!(successes, 2);
    }

    #[test]
    fn exactly_at_thresholds_stays_quiet() {
        let mut data = base(10);
        data.consistency = CONSISTENCY_FLOOR;
        data.productivity_score = PRODUCTIVITY_LOW;
        data.moods = MoodBreakdown {
            excellent: 4,
            good: 4,
            neutral: 2,
            poor: 0,
        };
        // 0.8 positive ratio is not strictly above the bar.
        let insights = generate(&data);
        assert!(insights.is_empty());
    }
}
