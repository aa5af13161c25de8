//! # Grounded Core Library
//!
//! This library provides the core logic for the Grounded wellness app:
//! guided breathwork and meditation sessions, daily activity tracking,
//! reflections and reminders. Every operation is available through the
//! standalone `grounded` CLI; a GUI would be a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Session timer**: a generic phase-sequencing state machine that requires
//!   the caller to invoke `tick()` once per second. [`SessionDriver`] runs one
//!   inside a tokio task and supplies those ticks.
//! - **Storage**: a JSON key-value store (SQLite or in-memory) and TOML-based
//!   configuration
//! - **Reminders**: daily notification plan behind a scheduler trait
//!
//! ## Key Components
//!
//! - [`PhaseSequencer`]: Core session state machine
//! - [`PhaseCatalog`]: Built-in breathwork patterns and meditation techniques
//! - [`ProgressTracker`]: Daily completions, streaks and reflections
//! - [`Config`]: Application configuration management
//! - [`NotificationScheduler`]: Trait for reminder back-ends

pub mod activity;
pub mod error;
pub mod events;
pub mod reminders;
pub mod storage;
pub mod timer;

pub use activity::Activity;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{EntryCause, Event, SessionSnapshot};
pub use reminders::{apply_reminder_settings, NotificationScheduler, Reminder, StoredScheduler};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, ProgressTracker};
pub use timer::{
    BreathKind, MeditationStep, Phase, PhaseCatalog, PhaseKind, PhaseList, PhaseSequencer,
    RunState, SessionDriver, SessionHandle,
};
