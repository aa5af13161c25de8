//! Daily completion records, lifetime statistics and reflections.
//!
//! All state lives in an injected [`KeyValueStore`]. Dates are passed in by
//! the caller so day rollover is explicit and testable.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kv::KeyValueStore;
use crate::activity;
use crate::error::StorageError;

const USER_DATA_KEY: &str = "user_data";
const LAST_ACTIVE_KEY: &str = "last_active_date";
const REFLECTIONS_KEY: &str = "reflections";
const DAILY_PREFIX: &str = "completed_activities_";

/// Calendar-day key in `YYYY-MM-DD` form.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Which activity ids were completed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: String,
    pub completed_activities: Vec<String>,
}

impl DailyProgress {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: date_key(date),
            completed_activities: Vec::new(),
        }
    }

    pub fn is_activity_completed(&self, activity_id: &str) -> bool {
        self.completed_activities.iter().any(|a| a == activity_id)
    }

    /// Returns `true` if the activity was not already recorded.
    pub fn complete_activity(&mut self, activity_id: &str) -> bool {
        if self.is_activity_completed(activity_id) {
            return false;
        }
        self.completed_activities.push(activity_id.to_string());
        true
    }

    pub fn completion_fraction(&self) -> f64 {
        activity::daily_completion_fraction(self.completed_activities.as_slice())
    }
}

/// User profile and lifetime statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub current_streak: u32,
    /// Day the streak last counted. At most one increment per day.
    #[serde(default)]
    pub last_streak_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_minutes: u32,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            name: String::new(),
            notifications_enabled: false,
            onboarding_completed: false,
            join_date: Utc::now(),
            total_sessions: 0,
            current_streak: 0,
            last_streak_date: None,
            total_minutes: 0,
        }
    }
}

/// A written reflection attached to a video or meditation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: Uuid,
    pub video_id: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl Reflection {
    pub fn new(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id: video_id.into(),
            text: text.into(),
            date: Utc::now(),
        }
    }
}

pub struct ProgressTracker<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ── Profile ──────────────────────────────────────────────────────

    pub fn user_data(&self) -> Result<Option<UserData>, StorageError> {
        self.store.load(USER_DATA_KEY)
    }

    pub fn save_user_data(&self, user: &UserData) -> Result<(), StorageError> {
        self.store.store(USER_DATA_KEY, user)
    }

    pub fn has_completed_onboarding(&self) -> Result<bool, StorageError> {
        Ok(self
            .user_data()?
            .map(|u| u.onboarding_completed)
            .unwrap_or(false))
    }

    pub fn complete_onboarding(&self) -> Result<(), StorageError> {
        let mut user = self.user_data()?.unwrap_or_default();
        user.onboarding_completed = true;
        self.save_user_data(&user)
    }

    // ── Daily progress ───────────────────────────────────────────────

    pub fn daily_progress(&self, date: NaiveDate) -> Result<DailyProgress, StorageError> {
        Ok(self
            .store
            .load(&daily_key(date))?
            .unwrap_or_else(|| DailyProgress::new(date)))
    }

    pub fn is_activity_completed(
        &self,
        activity_id: &str,
        date: NaiveDate,
    ) -> Result<bool, StorageError> {
        Ok(self.daily_progress(date)?.is_activity_completed(activity_id))
    }

    /// Record an activity as done on `date` and update lifetime stats.
    ///
    /// Completing the same activity twice on one day changes nothing.
    /// Returns whether the activity was newly recorded.
    pub fn complete_activity(
        &self,
        activity_id: &str,
        date: NaiveDate,
    ) -> Result<bool, StorageError> {
        let mut progress = self.daily_progress(date)?;
        if !progress.complete_activity(activity_id) {
            tracing::debug!(activity_id, date = %progress.date, "activity already completed");
            return Ok(false);
        }
        self.store.store(&daily_key(date), &progress)?;

        let mut user = self.user_data()?.unwrap_or_default();
        user.total_sessions += 1;
        user.total_minutes += activity::duration_min_for(activity_id);
        advance_streak(&mut user, date);
        self.save_user_data(&user)?;

        tracing::info!(
            activity_id,
            date = %progress.date,
            streak = user.current_streak,
            "activity completed"
        );
        Ok(true)
    }

    // ── Day rollover ─────────────────────────────────────────────────

    pub fn last_active_date(&self) -> Result<Option<NaiveDate>, StorageError> {
        let raw: Option<String> = self.store.load(LAST_ACTIVE_KEY)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }

    pub fn update_last_active(&self, date: NaiveDate) -> Result<(), StorageError> {
        self.store.store(LAST_ACTIVE_KEY, &date_key(date))
    }

    /// True when the app has not been active yet on `today`.
    pub fn should_reset_daily(&self, today: NaiveDate) -> Result<bool, StorageError> {
        Ok(self.last_active_date()? != Some(today))
    }

    /// Forget one day's completions and mark the previous day as last active.
    pub fn reset_day(&self, date: NaiveDate) -> Result<(), StorageError> {
        self.store.remove(&daily_key(date))?;
        self.update_last_active(date - Duration::days(1))
    }

    /// Remove profile, reflections and every daily record.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        for key in [USER_DATA_KEY, LAST_ACTIVE_KEY, REFLECTIONS_KEY] {
            self.store.remove(key)?;
        }
        for key in self.store.keys_with_prefix(DAILY_PREFIX)? {
            self.store.remove(&key)?;
        }
        Ok(())
    }

    // ── Reflections ──────────────────────────────────────────────────

    pub fn reflections(&self) -> Result<Vec<Reflection>, StorageError> {
        Ok(self.store.load(REFLECTIONS_KEY)?.unwrap_or_default())
    }

    pub fn save_reflection(&self, reflection: Reflection) -> Result<(), StorageError> {
        let mut all = self.reflections()?;
        all.push(reflection);
        self.store.store(REFLECTIONS_KEY, &all)
    }

    /// First reflection for `video_id` written on `date` (local calendar day).
    pub fn reflection_for(
        &self,
        video_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Reflection>, StorageError> {
        self.reflection_for_in(video_id, date, &Local)
    }

    /// Like [`Self::reflection_for`], with `date` taken as a calendar day in `tz`.
    pub fn reflection_for_in<Tz: TimeZone>(
        &self,
        video_id: &str,
        date: NaiveDate,
        tz: &Tz,
    ) -> Result<Option<Reflection>, StorageError> {
        Ok(self.reflections()?.into_iter().find(|r| {
            r.video_id == video_id && r.date.with_timezone(tz).date_naive() == date
        }))
    }

    /// Returns whether a reflection with `id` existed.
    pub fn delete_reflection(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut all = self.reflections()?;
        let before = all.len();
        all.retain(|r| r.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.store.store(REFLECTIONS_KEY, &all)?;
        Ok(true)
    }
}

/// Count `date` towards the streak once: continue it from the previous day,
/// restart it after a gap, ignore repeats and days older than the last one.
fn advance_streak(user: &mut UserData, date: NaiveDate) {
    match user.last_streak_date {
        Some(last) if last >= date => {}
        Some(last) if last == date - Duration::days(1) => {
            user.current_streak += 1;
            user.last_streak_date = Some(date);
        }
        _ => {
            user.current_streak = 1;
            user.last_streak_date = Some(date);
        }
    }
}

fn daily_key(date: NaiveDate) -> String {
    format!("{DAILY_PREFIX}{}", date_key(date))
}
