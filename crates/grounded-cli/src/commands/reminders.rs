use clap::Subcommand;
use grounded_core::{
    apply_reminder_settings, Config, Database, NotificationScheduler, ProgressTracker,
    StoredScheduler,
};

use super::CmdResult;

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Turn daily reminders on and schedule them
    Enable,
    /// Turn daily reminders off and cancel pending ones
    Disable,
    /// Show pending reminders as JSON
    List,
}

pub fn run(action: RemindersAction) -> CmdResult {
    let db = Database::open()?;
    let scheduler = StoredScheduler::new(&db);

    match action {
        RemindersAction::Enable | RemindersAction::Disable => {
            let enabled = matches!(action, RemindersAction::Enable);
            let mut config = Config::load()?;
            config.reminders.enabled = enabled;
            let pending = apply_reminder_settings(&scheduler, &config.reminders)?;
            config.save()?;

            let tracker = ProgressTracker::new(&db);
            let mut user = tracker.user_data()?.unwrap_or_default();
            user.notifications_enabled = enabled;
            tracker.save_user_data(&user)?;

            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
        RemindersAction::List => {
            let pending = scheduler.pending()?;
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
    }
    Ok(())
}
