//! Criterion benchmarks for hot paths in the triad engine.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - Streak recompute over a year of history (BTreeMap + backward scan)
//!   - Analytics aggregation (bucketing + ranking)
//!   - Achievement evaluation (catalog sweep)

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::{Days, NaiveDate, Utc};
use std::collections::HashSet;

use triad::{
    achievements::{evaluate, EvaluationInput},
    analytics::{aggregate, LookbackWindow},
    model::{Mood, PracticeSession, TimeSlot, UserStreak, Wish, WishCategory},
    streak,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A year of full practice days across three wishes.
fn year_of_sessions() -> (Vec<PracticeSession>, Vec<Wish>, NaiveDate) {
    let start = day(2025, 6, 1);
    let today = start.checked_add_days(Days::new(364)).unwrap();
    let wishes: Vec<Wish> = (0..3)
        .map(|i| Wish {
            id: format!("w{i}"),
            user_id: "u1".to_string(),
            title: format!("Wish {i}"),
            affirmation: "I am present".to_string(),
            category: WishCategory::Personal,
            is_active: true,
            created_at: Utc::now(),
        })
        .collect();

    let mut sessions = Vec::new();
    for offset in 0..365u64 {
        let date = start.checked_add_days(Days::new(offset)).unwrap();
        for (i, slot) in TimeSlot::all().into_iter().enumerate() {
            sessions.push(PracticeSession {
                id: format!("s-{offset}-{i}"),
                wish_id: format!("w{}", offset as usize % 3),
                user_id: "u1".to_string(),
                date,
                time_slot: slot,
                completed_count: slot.target_count(),
                target_count: slot.target_count(),
                mood: Some(if offset % 2 == 0 { Mood::Good } else { Mood::Neutral }),
                affirmation_text: "I am present".to_string(),
                created_at: Utc::now(),
            });
        }
    }
    (sessions, wishes, today)
}

fn bench_streak_recompute(c: &mut Criterion) {
    let (sessions, _, today) = year_of_sessions();
    let previous = UserStreak::default();
    let now = Utc::now();

    c.bench_function("streak_recompute_365_days", |b| {
        b.iter(|| {
            let up = streak::recompute(
                black_box(&previous),
                black_box(&sessions),
                black_box(today),
                now,
            );
            black_box(up);
        });
    });
}

fn bench_analytics_aggregate(c: &mut Criterion) {
    let (sessions, wishes, today) = year_of_sessions();

    c.bench_function("analytics_aggregate_365_window", |b| {
        b.iter(|| {
            let data = aggregate(
                black_box(&sessions),
                black_box(&wishes),
                LookbackWindow::Days365,
                black_box(today),
            );
            black_box(data);
        });
    });

    c.bench_function("analytics_aggregate_30_window", |b| {
        b.iter(|| {
            let data = aggregate(
                black_box(&sessions),
                black_box(&wishes),
                LookbackWindow::Days30,
                black_box(today),
            );
            black_box(data);
        });
    });
}

fn bench_achievement_evaluate(c: &mut Criterion) {
    let (sessions, _, today) = year_of_sessions();
    let daily_totals = streak::daily_totals(&sessions);
    let already_unlocked = HashSet::new();
    let now = Utc::now();

    c.bench_function("achievements_evaluate_full_catalog", |b| {
        b.iter(|| {
            let input = EvaluationInput {
                wish_count: 3,
                total_practices: sessions.len() as u64,
                current_streak: 365,
                daily_totals: black_box(&daily_totals),
                today,
            };
            let unlocked = evaluate(&input, black_box(&already_unlocked), now);
            black_box(unlocked);
        });
    });
}

criterion_group!(
    benches,
    bench_streak_recompute,
    bench_analytics_aggregate,
    bench_achievement_evaluate
);
criterion_main!(benches);
