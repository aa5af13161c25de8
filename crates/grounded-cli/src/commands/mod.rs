pub mod catalog;
pub mod config;
pub mod progress;
pub mod reflection;
pub mod reminders;
pub mod session;

/// Result type shared by every command handler.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;
