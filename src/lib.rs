// SPDX-License-Identifier: MIT
//! Triad — the engine behind a 369-manifestation journaling app.
//!
//! Users create wishes, log practice sessions (3 morning, 6 afternoon,
//! 9 evening repetitions — 18 units per completed day), and the engine
//! derives streaks, milestones, achievements, points, analytics, and
//! insights from the recorded history. The calculators are pure functions
//! over session records with time passed in explicitly; persistence sits
//! behind the [`storage`] layer and the
//! [`storage::progress::ProgressRepository`] seam.

pub mod achievements;
pub mod analytics;
pub mod config;
pub mod engine;
pub mod model;
pub mod storage;
pub mod streak;
