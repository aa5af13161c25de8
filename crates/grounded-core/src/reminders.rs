//! Daily reminder scheduling.
//!
//! The platform notification centre is abstracted behind
//! [`NotificationScheduler`]. [`StoredScheduler`] keeps the pending set in a
//! [`KeyValueStore`], which is all a terminal front-end can offer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError, ValidationError};
use crate::storage::{parse_time_of_day, KeyValueStore, RemindersConfig};

const PENDING_KEY: &str = "pending_reminders";

pub const MORNING_REMINDER: &str = "morning_reminder";
pub const MIDDAY_REMINDER: &str = "midday_reminder";
pub const EVENING_REMINDER: &str = "evening_reminder";

/// A notification repeating every day at `hour:minute` local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub hour: u8,
    pub minute: u8,
    pub title: String,
    pub body: String,
}

impl Reminder {
    /// # Errors
    /// Returns an error if the id is empty or the time is out of range.
    pub fn new(
        id: impl Into<String>,
        hour: u8,
        minute: u8,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let reminder = Self {
            id: id.into(),
            hour,
            minute,
            title: title.into(),
            body: body.into(),
        };
        reminder.validate()?;
        Ok(reminder)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "id".into(),
                message: "must not be empty".into(),
            });
        }
        if self.hour >= 24 {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.hour", self.id),
                message: format!("{} is not below 24", self.hour),
            });
        }
        if self.minute >= 60 {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.minute", self.id),
                message: format!("{} is not below 60", self.minute),
            });
        }
        Ok(())
    }

    /// `HH:MM`
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

pub trait NotificationScheduler {
    /// Schedule `reminder`, replacing any pending reminder with the same id.
    fn schedule_daily(&self, reminder: &Reminder) -> Result<()>;

    /// Returns whether a reminder with `id` was pending.
    fn cancel(&self, id: &str) -> Result<bool>;

    fn cancel_all(&self) -> Result<()>;

    fn pending(&self) -> Result<Vec<Reminder>>;
}

/// Scheduler persisting its pending set under `pending_reminders`.
pub struct StoredScheduler<S> {
    store: S,
}

impl<S: KeyValueStore> StoredScheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn save(&self, reminders: &[Reminder]) -> Result<(), StorageError> {
        self.store.store(PENDING_KEY, &reminders)
    }
}

impl<S: KeyValueStore> NotificationScheduler for StoredScheduler<S> {
    fn schedule_daily(&self, reminder: &Reminder) -> Result<()> {
        reminder.validate()?;
        let mut pending = self.pending()?;
        match pending.iter_mut().find(|r| r.id == reminder.id) {
            Some(existing) => *existing = reminder.clone(),
            None => pending.push(reminder.clone()),
        }
        self.save(&pending)?;
        tracing::debug!(id = %reminder.id, at = %reminder.time_label(), "reminder scheduled");
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<bool> {
        let mut pending = self.pending()?;
        let before = pending.len();
        pending.retain(|r| r.id != id);
        if pending.len() == before {
            return Ok(false);
        }
        self.save(&pending)?;
        tracing::debug!(id, "reminder cancelled");
        Ok(true)
    }

    fn cancel_all(&self) -> Result<()> {
        self.store.remove(PENDING_KEY)?;
        tracing::debug!("all reminders cancelled");
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Reminder>> {
        Ok(self.store.load(PENDING_KEY)?.unwrap_or_default())
    }
}

/// Morning, midday and evening reminders at the configured times.
///
/// # Errors
/// Returns an error if a configured time is not `HH:MM`.
pub fn default_plan(config: &RemindersConfig) -> Result<Vec<Reminder>> {
    let slots = [
        (
            MORNING_REMINDER,
            "reminders.morning",
            &config.morning,
            "Good morning! ☀️",
            "Start the day with morning breath",
        ),
        (
            MIDDAY_REMINDER,
            "reminders.midday",
            &config.midday,
            "Time for a pause? 🧘",
            "Take a short meditation",
        ),
        (
            EVENING_REMINDER,
            "reminders.evening",
            &config.evening,
            "Today's reflection 🌙",
            "Watch today's reflection and sum up your day",
        ),
    ];

    let mut plan = Vec::with_capacity(slots.len());
    for (id, key, time, title, body) in slots {
        let (hour, minute) = parse_time_of_day(key, time)?;
        plan.push(Reminder::new(id, hour, minute, title, body)?);
    }
    Ok(plan)
}

/// Bring the scheduler in line with `config`: schedule the daily plan when
/// reminders are enabled, cancel everything otherwise.
///
/// Returns the reminders now pending.
///
/// # Errors
/// Returns an error if the plan is invalid or the scheduler fails.
pub fn apply_reminder_settings<N: NotificationScheduler + ?Sized>(
    scheduler: &N,
    config: &RemindersConfig,
) -> Result<Vec<Reminder>> {
    if !config.enabled {
        scheduler.cancel_all()?;
        tracing::info!("reminders disabled");
        return Ok(Vec::new());
    }
    let plan = default_plan(config)?;
    for reminder in &plan {
        scheduler.schedule_daily(reminder)?;
    }
    tracing::info!(count = plan.len(), "reminders enabled");
    scheduler.pending()
}
