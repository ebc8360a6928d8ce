// SPDX-License-Identifier: MIT
//! Core domain types — wishes, practice sessions, streak state, achievements.
//!
//! Everything here is plain serialisable data. Calendar logic lives in the
//! `streak`, `achievements`, and `analytics` modules; storage mapping lives
//! in `storage`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Units a day must reach to count as completed: 3 + 6 + 9 repetitions.
pub const DAILY_TARGET: u32 = 18;

// ─── Time slot ────────────────────────────────────────────────────────────────

/// The three daily writing slots of the 369 method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// Repetitions expected in this slot (3 / 6 / 9).
    pub fn target_count(&self) -> u32 {
        match self {
            TimeSlot::Morning => 3,
            TimeSlot::Afternoon => 6,
            TimeSlot::Evening => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
        }
    }

    pub fn all() -> [TimeSlot; 3] {
        [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening]
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            "evening" => Ok(TimeSlot::Evening),
            other => Err(format!("unknown time slot: {other}")),
        }
    }
}

// ─── Mood ─────────────────────────────────────────────────────────────────────

/// Self-reported mood attached to a practice session. Optional — sessions
/// without a mood are skipped by mood-based aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excellent,
    Good,
    Neutral,
    Poor,
}

impl Mood {
    /// Score used by the productivity formula.
    pub fn score(&self) -> u32 {
        match self {
            Mood::Excellent => 100,
            Mood::Good => 80,
            Mood::Neutral => 60,
            Mood::Poor => 40,
        }
    }

    /// Whether this mood counts toward the positive-mood ratio.
    pub fn is_positive(&self) -> bool {
        matches!(self, Mood::Excellent | Mood::Good)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Excellent => "excellent",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Poor => "poor",
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excellent" => Ok(Mood::Excellent),
            "good" => Ok(Mood::Good),
            "neutral" => Ok(Mood::Neutral),
            "poor" => Ok(Mood::Poor),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

// ─── Wish category ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishCategory {
    Career,
    Health,
    Relationship,
    Wealth,
    Personal,
    Other,
}

impl WishCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishCategory::Career => "career",
            WishCategory::Health => "health",
            WishCategory::Relationship => "relationship",
            WishCategory::Wealth => "wealth",
            WishCategory::Personal => "personal",
            WishCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for WishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "career" => Ok(WishCategory::Career),
            "health" => Ok(WishCategory::Health),
            "relationship" => Ok(WishCategory::Relationship),
            "wealth" => Ok(WishCategory::Wealth),
            "personal" => Ok(WishCategory::Personal),
            "other" => Ok(WishCategory::Other),
            unknown => Err(format!("unknown category: {unknown}")),
        }
    }
}

// ─── Wish ─────────────────────────────────────────────────────────────────────

/// A manifestation goal the user journals toward.
///
/// Archiving (`is_active = false`) hides a wish without destroying its
/// history; hard deletion cascades to the wish's practice sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wish {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// The affirmation sentence written 3/6/9 times per day.
    pub affirmation: String,
    pub category: WishCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ─── Practice session ─────────────────────────────────────────────────────────

/// One logged writing slot. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: String,
    pub wish_id: String,
    pub user_id: String,
    /// Calendar day the session counts toward — not necessarily the day it
    /// was entered (users may backfill).
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    /// Repetitions actually written.
    pub completed_count: u32,
    /// Repetitions expected for the slot (3, 6, or 9).
    pub target_count: u32,
    pub mood: Option<Mood>,
    /// Concatenation of the written affirmation entries.
    pub affirmation_text: String,
    pub created_at: DateTime<Utc>,
}

// ─── Streak state ─────────────────────────────────────────────────────────────

/// One calendar day in the streak history window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakDay {
    pub date: NaiveDate,
    /// Total completed units across all slots that day.
    pub practice_count: u32,
    /// Whether the day reached [`DAILY_TARGET`].
    pub completed: bool,
}

/// A fixed streak-length threshold. `achieved` only ever flips false → true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub days: u32,
    pub achieved: bool,
    pub achieved_date: Option<DateTime<Utc>>,
    pub reward: String,
}

/// Derived streak state for one user, recomputed after every practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStreak {
    pub current_streak: u32,
    /// Never decreases; always ≥ `current_streak` after a recompute.
    pub longest_streak: u32,
    /// Most recent day that reached the daily threshold.
    pub last_practice_date: Option<NaiveDate>,
    /// Most recent 100 days that have any recorded practice, oldest first.
    pub streak_history: Vec<StreakDay>,
    pub milestones: Vec<Milestone>,
}

// ─── Achievement ──────────────────────────────────────────────────────────────

/// A catalog achievement with its unlock state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Machine-stable identifier, snake_case, e.g. `"week_warrior"`.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Points credited to the ledger on unlock.
    pub points: u32,
    /// Cosmetic feature enabled by this achievement, if any.
    pub feature_unlock: Option<String>,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
