use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::RunState;

/// Why a phase was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCause {
    /// First phase of a freshly started session.
    Start,
    /// Previous phase ran out.
    Elapsed,
    /// Caller skipped forward.
    Skip,
    /// Caller stepped back to the preceding phase.
    Rewind,
}

/// Every sequencer transition produces an Event.
/// Callers turn these into cues, progress records and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event<K> {
    /// A phase began. This is the cue hook (haptic pulse, chime).
    PhaseEntered {
        cause: EntryCause,
        round: u32,
        total_rounds: u32,
        phase_index: usize,
        phase_count: usize,
        kind: K,
        prompt: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Fired exactly once per run, when the last phase of the last round ends.
    Completed {
        rounds: u32,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    Stopped {
        at: DateTime<Utc>,
    },
}

impl<K> Event<K> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Event::Completed { .. })
    }
}

/// Full read-only view of a session, used for display and status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub list_key: String,
    pub state: RunState,
    pub round: u32,
    pub total_rounds: u32,
    pub phase_index: usize,
    /// 1-based, for "phase 2 of 5" displays.
    pub phase_number: usize,
    pub phase_count: usize,
    pub phase_label: String,
    pub prompt: String,
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    pub progress_fraction: f64,
    pub phase_started_at: Option<DateTime<Utc>>,
}
