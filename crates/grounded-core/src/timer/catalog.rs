//! Static phase tables for breathwork patterns and meditation techniques.
//!
//! Lookups are total: callers pass keys that come from user-facing choices,
//! so an unknown key resolves to a fallback list instead of failing.

use std::collections::BTreeMap;

use super::phase::{BreathKind, MeditationStep, Phase, PhaseList};

/// Breathwork patterns fall back to this key.
pub const DEFAULT_BREATHWORK: &str = "morning";

/// Key of the generic single-phase meditation used for unknown techniques.
pub const GENERIC_MEDITATION: &str = "meditation";

#[derive(Debug, Clone)]
pub struct PhaseCatalog {
    breathwork: BTreeMap<String, PhaseList<BreathKind>>,
    meditation: BTreeMap<String, PhaseList<MeditationStep>>,
    default_breathwork: PhaseList<BreathKind>,
    generic_meditation: PhaseList<MeditationStep>,
}

impl PhaseCatalog {
    pub fn new() -> Self {
        let breathwork = [morning(), box_breathing(), calm()]
            .into_iter()
            .map(|list| (list.key().to_string(), list))
            .collect();
        let meditation = [dynamic(), kundalini()]
            .into_iter()
            .map(|list| (list.key().to_string(), list))
            .collect();
        Self {
            breathwork,
            meditation,
            default_breathwork: morning(),
            generic_meditation: generic_meditation(),
        }
    }

    /// Breathwork pattern by key, or the morning pattern if unknown.
    pub fn breathwork(&self, key: &str) -> &PhaseList<BreathKind> {
        match self.breathwork.get(key) {
            Some(list) => list,
            None => {
                tracing::debug!(key, fallback = DEFAULT_BREATHWORK, "unknown breathwork pattern");
                &self.default_breathwork
            }
        }
    }

    /// Meditation technique by key, or a generic single-phase list if unknown.
    pub fn meditation(&self, key: &str) -> &PhaseList<MeditationStep> {
        match self.meditation.get(key) {
            Some(list) => list,
            None => {
                tracing::debug!(key, "unknown meditation, using generic phase list");
                &self.generic_meditation
            }
        }
    }

    pub fn contains_breathwork(&self, key: &str) -> bool {
        self.breathwork.contains_key(key)
    }

    pub fn contains_meditation(&self, key: &str) -> bool {
        self.meditation.contains_key(key)
    }

    pub fn breathwork_keys(&self) -> Vec<&str> {
        self.breathwork.keys().map(String::as_str).collect()
    }

    pub fn meditation_keys(&self) -> Vec<&str> {
        self.meditation.keys().map(String::as_str).collect()
    }
}

impl Default for PhaseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ── Breathwork ───────────────────────────────────────────────────────

fn morning() -> PhaseList<BreathKind> {
    PhaseList::builtin(
        "morning",
        "Morning Breath",
        "Energizing breathing to wake the body",
        vec![
            Phase::new(BreathKind::Inhale, 4, "Breathe in deeply"),
            Phase::new(BreathKind::Hold, 2, "Hold your breath"),
            Phase::new(BreathKind::Exhale, 6, "Breathe out slowly"),
        ],
    )
}

fn box_breathing() -> PhaseList<BreathKind> {
    PhaseList::builtin(
        "box",
        "Box Breathing",
        "4-4-4-4 breathing for calm and focus",
        vec![
            Phase::new(BreathKind::Inhale, 4, "Breathe in"),
            Phase::new(BreathKind::Hold, 4, "Hold"),
            Phase::new(BreathKind::Exhale, 4, "Breathe out"),
            Phase::new(BreathKind::Hold, 4, "Hold"),
        ],
    )
}

fn calm() -> PhaseList<BreathKind> {
    PhaseList::builtin(
        "calm",
        "4-7-8 Breathing",
        "Dr. Weil's technique for relaxation and sleep",
        vec![
            Phase::new(BreathKind::Inhale, 4, "Breathe in"),
            Phase::new(BreathKind::Hold, 7, "Hold"),
            Phase::new(BreathKind::Exhale, 8, "Breathe out"),
        ],
    )
}

// ── Meditation ───────────────────────────────────────────────────────

fn step(name: &str, minutes: u64, prompt: &str) -> Phase<MeditationStep> {
    Phase::minutes(MeditationStep::new(name), minutes, prompt)
}

fn dynamic() -> PhaseList<MeditationStep> {
    PhaseList::builtin(
        "dynamic",
        "Dynamic Meditation",
        "A powerful morning meditation in five stages: breathing, catharsis, mantra, silence and celebration.",
        vec![
            step("Chaotic Breathing", 10, "Breathe chaotically through the nose"),
            step("Catharsis", 10, "Explode! Let go of everything"),
            step("The Mantra", 10, "Jump and shout 'Hoo! Hoo! Hoo!'"),
            step("Silence", 15, "Stop! Freeze wherever you are"),
            step("Celebration", 15, "Dance and celebrate"),
        ],
    )
}

fn kundalini() -> PhaseList<MeditationStep> {
    PhaseList::builtin(
        "kundalini",
        "Kundalini Meditation",
        "Shaking, dancing and stillness to release tension in the body.",
        vec![
            step("Shaking", 15, "Let your body shake from the feet up"),
            step("Dancing", 15, "Dance freely in any way you feel"),
            step("Witnessing", 15, "Sit still and observe"),
            step("Stillness", 15, "Lie down and be still"),
        ],
    )
}

fn generic_meditation() -> PhaseList<MeditationStep> {
    PhaseList::builtin(
        GENERIC_MEDITATION,
        "Meditation",
        "A single quiet sitting.",
        vec![step("Meditation", 10, "Breathe and relax")],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::PhaseKind;

    #[test]
    fn unknown_breathwork_falls_back_to_morning() {
        let catalog = PhaseCatalog::new();
        let list = catalog.breathwork("does-not-exist");
        assert_eq!(list.key(), "morning");
        let durations: Vec<u64> = list.phases().iter().map(|p| p.duration_secs).collect();
        assert_eq!(durations, vec![4, 2, 6]);
    }

    #[test]
    fn unknown_meditation_falls_back_to_generic() {
        let catalog = PhaseCatalog::new();
        let list = catalog.meditation("nadabrahma");
        assert_eq!(list.key(), GENERIC_MEDITATION);
        assert_eq!(list.len(), 1);
        assert_eq!(list.first().duration_secs, 600);
    }

    #[test]
    fn dynamic_has_five_named_phases() {
        let catalog = PhaseCatalog::new();
        let list = catalog.meditation("dynamic");
        let names: Vec<&str> = list.phases().iter().map(|p| p.kind.label()).collect();
        assert_eq!(
            names,
            vec!["Chaotic Breathing", "Catharsis", "The Mantra", "Silence", "Celebration"]
        );
        assert_eq!(list.round_secs(), 60 * 60);
    }

    #[test]
    fn keys_are_sorted() {
        let catalog = PhaseCatalog::new();
        assert_eq!(catalog.breathwork_keys(), vec!["box", "calm", "morning"]);
        assert_eq!(catalog.meditation_keys(), vec!["dynamic", "kundalini"]);
        assert!(catalog.contains_breathwork("box"));
        assert!(!catalog.contains_meditation("box"));
    }
}
