use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Tag carried by every phase. Breathwork and meditation each supply their
/// own closed set of kinds; the sequencer only ever asks for a label.
pub trait PhaseKind: Clone + fmt::Debug + Send + 'static {
    fn label(&self) -> &str;
}

/// Breathwork phase types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathKind {
    Inhale,
    Hold,
    Exhale,
}

impl PhaseKind for BreathKind {
    fn label(&self) -> &str {
        match self {
            BreathKind::Inhale => "inhale",
            BreathKind::Hold => "hold",
            BreathKind::Exhale => "exhale",
        }
    }
}

/// A named stage of a meditation technique ("Shaking", "Stillness", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationStep {
    pub name: String,
}

impl MeditationStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PhaseKind for MeditationStep {
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase<K> {
    pub kind: K,
    pub duration_secs: u64,
    /// Display text. Never interpreted by the engine.
    pub prompt: String,
}

impl<K> Phase<K> {
    pub fn new(kind: K, duration_secs: u64, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            duration_secs,
            prompt: prompt.into(),
        }
    }

    /// Convenience for meditation tables, which are written in minutes.
    pub fn minutes(kind: K, duration_min: u64, prompt: impl Into<String>) -> Self {
        Self::new(kind, duration_min.saturating_mul(60), prompt)
    }
}

/// An ordered, non-empty, immutable list of phases identified by a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseList<K> {
    key: String,
    name: String,
    description: String,
    phases: Vec<Phase<K>>,
}

impl<K> PhaseList<K> {
    /// Build a phase list.
    ///
    /// # Errors
    /// Returns an error if `phases` is empty or any phase has a zero duration.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        phases: Vec<Phase<K>>,
    ) -> Result<Self, ValidationError> {
        let key = key.into();
        if phases.is_empty() {
            return Err(ValidationError::EmptyCollection(format!(
                "phase list '{key}' has no phases"
            )));
        }
        if let Some(pos) = phases.iter().position(|p| p.duration_secs == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{key}.phases[{pos}].duration_secs"),
                message: "must be positive".into(),
            });
        }
        Ok(Self {
            key,
            name: name.into(),
            description: description.into(),
            phases,
        })
    }

    /// Built-in tables only; callers guarantee a non-empty list of positive durations.
    pub(super) fn builtin(key: &str, name: &str, description: &str, phases: Vec<Phase<K>>) -> Self {
        debug_assert!(!phases.is_empty() && phases.iter().all(|p| p.duration_secs > 0));
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            phases,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phases(&self) -> &[Phase<K>] {
        &self.phases
    }

    pub fn get(&self, index: usize) -> Option<&Phase<K>> {
        self.phases.get(index)
    }

    pub fn first(&self) -> &Phase<K> {
        // Non-empty by construction.
        &self.phases[0]
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Sum of all phase durations for one round.
    pub fn round_secs(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_secs).sum()
    }
}
