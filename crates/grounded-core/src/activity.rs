//! Daily activity catalog.
//!
//! Three fixed daily activities plus one bonus meditation that depends on the
//! time of day. Activity ids are the keys recorded in daily progress.

use serde::{Deserialize, Serialize};

/// Minutes credited for an activity id nobody recognises.
pub const DEFAULT_ACTIVITY_MINUTES: u32 = 5;

/// Hour (local, 24h) from which the bonus switches to Kundalini.
pub const BONUS_SWITCH_HOUR: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Breathwork,
    Meditation,
    Video,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: &'static str,
    pub label: &'static str,
    pub title: &'static str,
    pub duration_min: u32,
    pub kind: ActivityKind,
}

pub const MORNING_BREATH: Activity = Activity {
    id: "morning_breath",
    label: "MORNING",
    title: "Morning Breath",
    duration_min: 5,
    kind: ActivityKind::Breathwork,
};

pub const MIDDAY_RESET: Activity = Activity {
    id: "midday_reset",
    label: "MIDDAY",
    title: "Midday Reset",
    duration_min: 5,
    kind: ActivityKind::Quote,
};

pub const EVENING_REFLECTION: Activity = Activity {
    id: "evening_reflection",
    label: "EVENING",
    title: "Evening Reflection",
    duration_min: 10,
    kind: ActivityKind::Video,
};

pub const DYNAMIC_MEDITATION: Activity = Activity {
    id: "dynamic_meditation",
    label: "BONUS",
    title: "Dynamic Meditation",
    duration_min: 60,
    kind: ActivityKind::Meditation,
};

pub const KUNDALINI_MEDITATION: Activity = Activity {
    id: "kundalini_meditation",
    label: "BONUS",
    title: "Kundalini Meditation",
    duration_min: 60,
    kind: ActivityKind::Meditation,
};

const ALL: [Activity; 5] = [
    MORNING_BREATH,
    MIDDAY_RESET,
    EVENING_REFLECTION,
    DYNAMIC_MEDITATION,
    KUNDALINI_MEDITATION,
];

impl Activity {
    /// The three activities offered every day, in display order.
    pub fn daily() -> [Activity; 3] {
        [MORNING_BREATH, MIDDAY_RESET, EVENING_REFLECTION]
    }

    /// Dynamic before 15:00, Kundalini afterwards.
    pub fn bonus_for_hour(hour: u32) -> Activity {
        if hour < BONUS_SWITCH_HOUR {
            DYNAMIC_MEDITATION
        } else {
            KUNDALINI_MEDITATION
        }
    }

    pub fn find(id: &str) -> Option<Activity> {
        ALL.into_iter().find(|a| a.id == id)
    }
}

/// Minutes credited to lifetime stats when `id` is completed.
pub fn duration_min_for(id: &str) -> u32 {
    Activity::find(id)
        .map(|a| a.duration_min)
        .unwrap_or(DEFAULT_ACTIVITY_MINUTES)
}

/// Activity recorded when a breathwork session completes.
pub fn activity_for_breathwork() -> &'static str {
    MORNING_BREATH.id
}

/// Activity recorded when a meditation session completes, if the technique
/// is one of the bonus meditations.
pub fn activity_for_meditation(technique: &str) -> Option<&'static str> {
    match technique {
        "dynamic" => Some(DYNAMIC_MEDITATION.id),
        "kundalini" => Some(KUNDALINI_MEDITATION.id),
        _ => None,
    }
}

/// Fraction of the daily activities present in `completed`.
pub fn daily_completion_fraction<S: AsRef<str>>(completed: &[S]) -> f64 {
    let daily = Activity::daily();
    let done = daily
        .iter()
        .filter(|a| completed.iter().any(|c| c.as_ref() == a.id))
        .count();
    done as f64 / daily.len() as f64
}
