use clap::Subcommand;
use grounded_core::storage::Reflection;
use grounded_core::{Database, ProgressTracker};
use uuid::Uuid;

use super::CmdResult;

#[derive(Subcommand)]
pub enum ReflectionAction {
    /// Save a reflection for a video or meditation
    Add {
        /// Video ID the reflection belongs to
        video: String,
        /// Reflection text
        text: String,
    },
    /// List all reflections as JSON
    List,
    /// Delete a reflection
    Delete {
        /// Reflection ID
        id: Uuid,
    },
}

pub fn run(action: ReflectionAction) -> CmdResult {
    let tracker = ProgressTracker::new(Database::open()?);

    match action {
        ReflectionAction::Add { video, text } => {
            if text.trim().is_empty() {
                return Err("reflection text is empty".into());
            }
            let reflection = Reflection::new(video, text);
            let id = reflection.id;
            tracker.save_reflection(reflection)?;
            println!("{id}");
        }
        ReflectionAction::List => {
            let all = tracker.reflections()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        ReflectionAction::Delete { id } => {
            if !tracker.delete_reflection(id)? {
                return Err(format!("reflection not found: {id}").into());
            }
            println!("deleted: {id}");
        }
    }
    Ok(())
}
