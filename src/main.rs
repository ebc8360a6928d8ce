// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use triad::{
    analytics::LookbackWindow,
    config::EngineConfig,
    engine::PracticeEngine,
    model::{Mood, TimeSlot, WishCategory},
    storage::{
        progress::{ProgressRepository, SqliteProgressStore},
        Storage,
    },
};

#[derive(Parser)]
#[command(
    name = "triad",
    about = "Triad — 369 manifestation practice tracker",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "TRIAD_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRIAD_LOG", global = true)]
    log: Option<String>,

    /// User id to act as (default: "local", or `user` from config.toml)
    #[arg(long, env = "TRIAD_USER", global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Manage wishes.
    ///
    /// A wish is an affirmation you write toward: 3 times in the morning,
    /// 6 in the afternoon, 9 in the evening.
    ///
    /// Examples:
    ///   triad wish add --title "Calm mornings" --affirmation "I wake up calm" --category health
    ///   triad wish list
    ///   triad wish archive <id>
    Wish {
        #[command(subcommand)]
        action: WishAction,
    },
    /// Log a practice session.
    ///
    /// Examples:
    ///   triad practice log --wish <id> --slot morning --count 3
    ///   triad practice log --wish <id> --slot evening --count 9 --mood good
    ///   triad practice log --wish <id> --slot evening --count 9 --date 2026-03-01
    Practice {
        #[command(subcommand)]
        action: PracticeAction,
    },
    /// Show current streak, milestones, and today's progress.
    ///
    /// Examples:
    ///   triad status
    Status {
        /// Print as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Show the achievement catalog with unlock state and points.
    ///
    /// Examples:
    ///   triad achievements
    Achievements {
        /// Print as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Show practice analytics for a lookback window.
    ///
    /// Examples:
    ///   triad analytics
    ///   triad analytics --window 90 --json
    Analytics {
        /// Lookback window in days: 30, 90, or 365
        #[arg(long)]
        window: Option<String>,
        /// Print as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Show generated practice suggestions.
    ///
    /// Examples:
    ///   triad insights
    ///   triad insights --window 90
    Insights {
        /// Lookback window in days: 30, 90, or 365
        #[arg(long)]
        window: Option<String>,
        /// Print as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WishAction {
    /// Create a new wish.
    Add {
        #[arg(long)]
        title: String,
        /// The affirmation sentence to write each day
        #[arg(long)]
        affirmation: String,
        /// career | health | relationship | wealth | personal | other
        #[arg(long, default_value = "personal")]
        category: String,
    },
    /// List wishes (active only by default).
    List {
        /// Include archived wishes
        #[arg(long)]
        all: bool,
    },
    /// Archive a wish — hides it while keeping its practice history.
    Archive { id: String },
    /// Permanently delete a wish and all of its practice sessions.
    Remove { id: String },
}

#[derive(Subcommand)]
enum PracticeAction {
    /// Record a writing session for one slot.
    Log {
        /// Wish id the session belongs to
        #[arg(long)]
        wish: String,
        /// morning | afternoon | evening
        #[arg(long)]
        slot: String,
        /// Repetitions actually written
        #[arg(long)]
        count: u32,
        /// excellent | good | neutral | poor
        #[arg(long)]
        mood: Option<String>,
        /// Calendar day the session counts toward, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// The affirmation text as written
        #[arg(long, default_value = "")]
        text: String,
    },
}

fn setup_logging(log_level: &str, log_format: &str) {
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .init();
    }
}

fn parse_window(raw: Option<String>, default_days: u32) -> Result<LookbackWindow> {
    let raw = raw.unwrap_or_else(|| default_days.to_string());
    raw.parse::<LookbackWindow>().map_err(anyhow::Error::msg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = EngineConfig::new(args.data_dir, args.log, args.user);
    setup_logging(&config.log, &config.log_format);

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    let progress: Arc<dyn ProgressRepository> =
        Arc::new(SqliteProgressStore::new(storage.pool()));
    let engine = PracticeEngine::new(storage, progress);

    let user = config.user.clone();
    let now = Utc::now();
    let today = now.date_naive();

    match args.command {
        Command::Wish { action } => match action {
            WishAction::Add {
                title,
                affirmation,
                category,
            } => {
                let category: WishCategory =
                    category.parse().map_err(anyhow::Error::msg)?;
                let wish = engine
                    .create_wish(&user, &title, &affirmation, category, now)
                    .await?;
                println!("Created wish {} — {}", wish.id, wish.title);
            }
            WishAction::List { all } => {
                let wishes = engine.list_wishes(&user, all).await?;
                if wishes.is_empty() {
                    println!("No wishes yet. Create one with: triad wish add");
                } else {
                    for w in wishes {
                        let marker = if w.is_active { " " } else { "archived" };
                        println!(
                            "{}  {:<12} {:<10} {}",
                            w.id,
                            w.category.as_str(),
                            marker,
                            w.title
                        );
                    }
                }
            }
            WishAction::Archive { id } => {
                engine.archive_wish(&id).await?;
                println!("Archived wish {id}");
            }
            WishAction::Remove { id } => {
                engine.delete_wish(&id).await?;
                println!("Deleted wish {id} and its practice history");
            }
        },
        Command::Practice { action } => match action {
            PracticeAction::Log {
                wish,
                slot,
                count,
                mood,
                date,
                text,
            } => {
                let slot: TimeSlot = slot.parse().map_err(anyhow::Error::msg)?;
                let mood: Option<Mood> = match mood {
                    Some(m) => Some(m.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                };
                let date: Option<NaiveDate> = match date {
                    Some(d) => Some(
                        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                            .context("--date must be YYYY-MM-DD")?,
                    ),
                    None => None,
                };

                let outcome = engine
                    .complete_practice(&user, &wish, slot, count, mood, &text, date, now)
                    .await?;

                println!(
                    "Logged {} × {} ({})",
                    outcome.session.completed_count,
                    outcome.session.time_slot.as_str(),
                    outcome.session.date
                );
                println!(
                    "Streak: {} day(s) (longest {})",
                    outcome.streak.current_streak, outcome.streak.longest_streak
                );
                for m in &outcome.new_milestones {
                    println!("Milestone reached: {} days — {}", m.days, m.reward);
                }
                for a in &outcome.new_achievements {
                    println!("Achievement unlocked: {} (+{} pts)", a.name, a.points);
                    if let Some(feature) = &a.feature_unlock {
                        println!("  unlocks: {feature}");
                    }
                }
                if outcome.points_awarded > 0 {
                    println!("Points awarded: {}", outcome.points_awarded);
                }
            }
        },
        Command::Status { json } => {
            let report = engine.status(&user, today).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "currentStreak": report.streak.current_streak,
                        "longestStreak": report.streak.longest_streak,
                        "lastPracticeDate": report.streak.last_practice_date,
                        "todayUnits": report.today_units,
                        "todayCompleted": report.today_completed,
                        "totalPoints": report.total_points,
                        "milestones": report.streak.milestones,
                    }))?
                );
            } else {
                println!(
                    "Streak: {} day(s) (longest {})",
                    report.streak.current_streak, report.streak.longest_streak
                );
                println!("Today: {}/18 units", report.today_units);
                if report.today_completed {
                    println!("Today's practice is complete.");
                }
                println!("Points: {}", report.total_points);
                for m in &report.streak.milestones {
                    let mark = if m.achieved { "[x]" } else { "[ ]" };
                    println!("  {mark} {:>3} days — {}", m.days, m.reward);
                }
            }
        }
        Command::Achievements { json } => {
            let achievements = engine.achievements(&user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&achievements)?);
            } else {
                for a in achievements {
                    let mark = if a.unlocked { "[x]" } else { "[ ]" };
                    println!("{mark} {:<16} {:>4} pts  {}", a.name, a.points, a.description);
                }
            }
        }
        Command::Analytics { window, json } => {
            let window = parse_window(window, config.analytics_window)?;
            let data = engine.analytics(&user, window, today).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("Last {} days:", data.window_days);
                println!("  sessions:     {}", data.session_count);
                println!(
                    "  active days:  {} ({:.0}% consistency)",
                    data.active_days,
                    data.consistency * 100.0
                );
                println!("  productivity: {:.0}/100", data.productivity_score);
                println!(
                    "  slots:        morning {} / afternoon {} / evening {}",
                    data.time_of_day.morning, data.time_of_day.afternoon, data.time_of_day.evening
                );
                for wc in &data.wish_completion {
                    println!(
                        "  {:<30} {:>5.0}%  ({}/{} units)",
                        wc.title,
                        wc.completion_rate * 100.0,
                        wc.completed_units,
                        wc.target_units
                    );
                }
            }
        }
        Command::Insights { window, json } => {
            let window = parse_window(window, config.analytics_window)?;
            let insights = engine.insights(&user, window, today).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            } else if insights.is_empty() {
                println!("No insights yet — log some practice first.");
            } else {
                for i in insights {
                    println!("[{}] {}", i.kind.as_str(), i.message);
                }
            }
        }
    }

    Ok(())
}
