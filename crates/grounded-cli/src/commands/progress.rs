use chrono::{Local, Timelike};
use clap::Subcommand;
use grounded_core::storage::progress::today;
use grounded_core::{Activity, Database, ProgressTracker};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show today's activities and which are done
    Today,
    /// Show lifetime statistics
    Stats,
    /// Mark an activity as completed today
    Complete {
        /// Activity ID (e.g. "morning_breath")
        id: String,
    },
    /// Forget today's completions
    ResetToday,
}

pub fn run(action: ProgressAction) -> CmdResult {
    let tracker = ProgressTracker::new(Database::open()?);
    let date = today();

    match action {
        ProgressAction::Today => {
            if tracker.should_reset_daily(date)? {
                tracing::debug!(%date, "first run today");
                tracker.update_last_active(date)?;
            }
            let progress = tracker.daily_progress(date)?;
            let bonus = Activity::bonus_for_hour(Local::now().hour());
            let activities: Vec<_> = Activity::daily()
                .into_iter()
                .chain(std::iter::once(bonus))
                .map(|a| {
                    serde_json::json!({
                        "id": a.id,
                        "label": a.label,
                        "title": a.title,
                        "duration_min": a.duration_min,
                        "kind": a.kind,
                        "completed": progress.is_activity_completed(a.id),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "date": progress.date,
                "completion_fraction": progress.completion_fraction(),
                "activities": activities,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::Stats => {
            let user = tracker.user_data()?.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        ProgressAction::Complete { id } => {
            if Activity::find(&id).is_none() {
                tracing::warn!(id = %id, "unknown activity id, recording anyway");
            }
            let newly = tracker.complete_activity(&id, date)?;
            tracker.update_last_active(date)?;
            if newly {
                println!("completed: {id}");
            } else {
                println!("already completed today: {id}");
            }
        }
        ProgressAction::ResetToday => {
            tracker.reset_day(date)?;
            println!("today's progress cleared");
        }
    }
    Ok(())
}
