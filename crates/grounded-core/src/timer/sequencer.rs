//! Phase-sequencing session timer.
//!
//! The sequencer is a synchronous state machine with no internal threads.
//! Something else owns the clock and calls `tick()` once per second while
//! the session is running (see [`super::driver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |           |
//!           +-----------+--> Completed
//! any -> (stop) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let catalog = PhaseCatalog::new();
//! let mut seq = PhaseSequencer::breathwork(&catalog, "box", None)?;
//! seq.start();
//! // Once per second:
//! if let Some(event) = seq.tick() { /* cue, record, ... */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::PhaseCatalog;
use super::phase::{BreathKind, MeditationStep, Phase, PhaseKind, PhaseList};
use crate::error::ValidationError;
use crate::events::{EntryCause, Event, SessionSnapshot};

/// Breathwork sessions repeat their pattern this many times unless told otherwise.
pub const DEFAULT_BREATHWORK_ROUNDS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Generic session timer over a phase list and a round count.
#[derive(Debug, Clone)]
pub struct PhaseSequencer<K> {
    phases: PhaseList<K>,
    total_rounds: u32,
    state: RunState,
    /// 0 before start, 1-based afterwards.
    round: u32,
    phase_index: usize,
    remaining_secs: u64,
    phase_started_at: Option<DateTime<Utc>>,
}

impl<K: PhaseKind> PhaseSequencer<K> {
    /// Create an idle sequencer.
    ///
    /// # Errors
    /// Returns an error if `total_rounds` is zero.
    pub fn new(phases: PhaseList<K>, total_rounds: u32) -> Result<Self, ValidationError> {
        if total_rounds == 0 {
            return Err(ValidationError::InvalidValue {
                field: "total_rounds".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(Self::idle(phases, total_rounds))
    }

    fn idle(phases: PhaseList<K>, total_rounds: u32) -> Self {
        let remaining_secs = phases.first().duration_secs;
        Self {
            phases,
            total_rounds,
            state: RunState::Idle,
            round: 0,
            phase_index: 0,
            remaining_secs,
            phase_started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    /// 1-based position within the round, for "phase 2 of 5" displays.
    pub fn phase_number(&self) -> usize {
        self.phase_index + 1
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.current_phase()
            .duration_secs
            .saturating_sub(self.remaining_secs)
    }

    pub fn current_phase(&self) -> &Phase<K> {
        self.phases
            .get(self.phase_index)
            .unwrap_or_else(|| self.phases.first())
    }

    pub fn phase_list(&self) -> &PhaseList<K> {
        &self.phases
    }

    pub fn phase_started_at(&self) -> Option<DateTime<Utc>> {
        self.phase_started_at
    }

    /// Planned length of the whole session.
    pub fn total_secs(&self) -> u64 {
        self.phases
            .round_secs()
            .saturating_mul(u64::from(self.total_rounds))
    }

    /// Completed phase units over total phase units.
    ///
    /// 0.0 before start, 1.0 only once completed.
    pub fn progress_fraction(&self) -> f64 {
        match self.state {
            RunState::Completed => 1.0,
            _ if self.round == 0 => 0.0,
            _ => {
                let len = self.phases.len() as f64;
                let total = len * f64::from(self.total_rounds);
                let done = f64::from(self.round - 1) * len + self.phase_index as f64;
                done / total
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let phase = self.current_phase();
        SessionSnapshot {
            list_key: self.phases.key().to_string(),
            state: self.state,
            round: self.round,
            total_rounds: self.total_rounds,
            phase_index: self.phase_index,
            phase_number: self.phase_number(),
            phase_count: self.phases.len(),
            phase_label: phase.kind.label().to_string(),
            prompt: phase.prompt.clone(),
            remaining_secs: self.remaining_secs,
            elapsed_secs: self.elapsed_secs(),
            progress_fraction: self.progress_fraction(),
            phase_started_at: self.phase_started_at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event<K>> {
        if self.state != RunState::Idle {
            tracing::debug!(state = ?self.state, "start ignored");
            return None;
        }
        self.round = 1;
        self.phase_index = 0;
        self.state = RunState::Running;
        tracing::info!(
            list = self.phases.key(),
            rounds = self.total_rounds,
            "session started"
        );
        Some(self.enter_phase(EntryCause::Start))
    }

    pub fn pause(&mut self) -> Option<Event<K>> {
        if self.state != RunState::Running {
            tracing::debug!(state = ?self.state, "pause ignored");
            return None;
        }
        self.state = RunState::Paused;
        Some(Event::Paused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event<K>> {
        if self.state != RunState::Paused {
            tracing::debug!(state = ?self.state, "resume ignored");
            return None;
        }
        self.state = RunState::Running;
        Some(Event::Resumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Return to idle from any state. Always succeeds.
    pub fn stop(&mut self) -> Option<Event<K>> {
        self.state = RunState::Idle;
        self.round = 0;
        self.phase_index = 0;
        self.remaining_secs = self.phases.first().duration_secs;
        self.phase_started_at = None;
        Some(Event::Stopped { at: Utc::now() })
    }

    /// End the current phase now. A paused session stays paused on the new phase.
    pub fn skip_forward(&mut self) -> Option<Event<K>> {
        if !self.is_active() {
            tracing::debug!(state = ?self.state, "skip forward ignored");
            return None;
        }
        Some(self.advance(EntryCause::Skip))
    }

    /// Restart the preceding phase from its full duration.
    ///
    /// At the first phase of a later round this steps back into the last
    /// phase of the previous round. No-op at round 1, phase 0.
    pub fn skip_backward(&mut self) -> Option<Event<K>> {
        if !self.is_active() {
            tracing::debug!(state = ?self.state, "skip backward ignored");
            return None;
        }
        if self.phase_index > 0 {
            self.phase_index -= 1;
        } else if self.round > 1 {
            self.round -= 1;
            self.phase_index = self.phases.len() - 1;
        } else {
            return None;
        }
        Some(self.enter_phase(EntryCause::Rewind))
    }

    /// Advance the clock by one second. Returns an event when a phase boundary is crossed.
    pub fn tick(&mut self) -> Option<Event<K>> {
        if self.state != RunState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.advance(EntryCause::Elapsed));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_active(&self) -> bool {
        matches!(self.state, RunState::Running | RunState::Paused)
    }

    fn advance(&mut self, cause: EntryCause) -> Event<K> {
        self.phase_index += 1;
        if self.phase_index >= self.phases.len() {
            self.phase_index = 0;
            self.round += 1;
        }
        if self.round > self.total_rounds {
            return self.complete();
        }
        self.enter_phase(cause)
    }

    fn enter_phase(&mut self, cause: EntryCause) -> Event<K> {
        let at = Utc::now();
        let phase = self.current_phase().clone();
        self.remaining_secs = phase.duration_secs;
        self.phase_started_at = Some(at);
        Event::PhaseEntered {
            cause,
            round: self.round,
            total_rounds: self.total_rounds,
            phase_index: self.phase_index,
            phase_count: self.phases.len(),
            kind: phase.kind,
            prompt: phase.prompt,
            duration_secs: phase.duration_secs,
            at,
        }
    }

    fn complete(&mut self) -> Event<K> {
        // Park on the final phase so displays read "phase N of N".
        self.state = RunState::Completed;
        self.round = self.total_rounds;
        self.phase_index = self.phases.len() - 1;
        self.remaining_secs = 0;
        tracing::info!(
            list = self.phases.key(),
            rounds = self.total_rounds,
            "session completed"
        );
        Event::Completed {
            rounds: self.total_rounds,
            total_secs: self.total_secs(),
            at: Utc::now(),
        }
    }
}

impl PhaseSequencer<BreathKind> {
    /// Breathwork session for a catalog pattern, repeating `rounds` times
    /// (default [`DEFAULT_BREATHWORK_ROUNDS`]).
    ///
    /// # Errors
    /// Returns an error if `rounds` is `Some(0)`.
    pub fn breathwork(
        catalog: &PhaseCatalog,
        key: &str,
        rounds: Option<u32>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            catalog.breathwork(key).clone(),
            rounds.unwrap_or(DEFAULT_BREATHWORK_ROUNDS),
        )
    }
}

impl PhaseSequencer<MeditationStep> {
    /// Single-round meditation session for a catalog technique.
    pub fn meditation(catalog: &PhaseCatalog, key: &str) -> Self {
        Self::idle(catalog.meditation(key).clone(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morning() -> PhaseSequencer<BreathKind> {
        PhaseSequencer::breathwork(&PhaseCatalog::new(), "morning", None).unwrap()
    }

    #[test]
    fn start_pause_resume() {
        let mut seq = morning();
        assert_eq!(seq.state(), RunState::Idle);
        assert_eq!(seq.round(), 0);

        assert!(seq.start().is_some());
        assert_eq!(seq.state(), RunState::Running);
        assert_eq!(seq.round(), 1);

        assert!(seq.pause().is_some());
        assert_eq!(seq.state(), RunState::Paused);

        assert!(seq.resume().is_some());
        assert_eq!(seq.state(), RunState::Running);
    }

    #[test]
    fn invalid_transitions_are_no_ops() {
        let mut seq = morning();
        assert!(seq.pause().is_none());
        assert!(seq.resume().is_none());
        assert!(seq.skip_forward().is_none());
        assert!(seq.skip_backward().is_none());
        assert!(seq.tick().is_none());
        assert_eq!(seq.state(), RunState::Idle);

        seq.start();
        assert!(seq.start().is_none());
        assert!(seq.resume().is_none());
        seq.pause();
        assert!(seq.start().is_none());
        assert!(seq.pause().is_none());
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let err = PhaseSequencer::breathwork(&PhaseCatalog::new(), "box", Some(0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn ticks_do_nothing_while_paused() {
        let mut seq = morning();
        seq.start();
        seq.tick();
        seq.pause();
        for _ in 0..10 {
            assert!(seq.tick().is_none());
        }
        assert_eq!(seq.remaining_secs(), 3);
        assert_eq!(seq.elapsed_secs(), 1);
    }

    #[test]
    fn skip_forward_while_paused_stays_paused() {
        let mut seq = morning();
        seq.start();
        seq.tick();
        seq.pause();
        let event = seq.skip_forward().unwrap();
        assert!(matches!(
            event,
            Event::PhaseEntered {
                cause: EntryCause::Skip,
                phase_index: 1,
                kind: BreathKind::Hold,
                ..
            }
        ));
        assert_eq!(seq.state(), RunState::Paused);
        assert_eq!(seq.remaining_secs(), 2);
    }

    #[test]
    fn skip_backward_restarts_previous_phase() {
        let mut seq = morning();
        seq.start();
        seq.skip_forward();
        seq.tick();
        assert_eq!(seq.phase_index(), 1);
        assert_eq!(seq.remaining_secs(), 1);

        seq.skip_backward().unwrap();
        assert_eq!(seq.phase_index(), 0);
        assert_eq!(seq.remaining_secs(), 4);
    }

    #[test]
    fn stop_resets_to_idle_and_allows_restart() {
        let mut seq = morning();
        seq.start();
        seq.skip_forward();
        seq.skip_forward();
        assert!(matches!(seq.stop(), Some(Event::Stopped { .. })));
        assert_eq!(seq.state(), RunState::Idle);
        assert_eq!(seq.round(), 0);
        assert_eq!(seq.phase_index(), 0);
        assert_eq!(seq.remaining_secs(), 4);
        assert!(seq.phase_started_at().is_none());
        assert!(seq.start().is_some());
    }

    #[test]
    fn completed_session_ignores_further_commands() {
        let mut seq = PhaseSequencer::meditation(&PhaseCatalog::new(), "unknown");
        seq.start();
        assert!(seq.skip_forward().unwrap().is_completed());
        assert_eq!(seq.state(), RunState::Completed);
        assert!(seq.skip_forward().is_none());
        assert!(seq.skip_backward().is_none());
        assert!(seq.tick().is_none());
        assert!(seq.start().is_none());
        assert_eq!(seq.progress_fraction(), 1.0);
        assert_eq!(seq.remaining_secs(), 0);
    }

    #[test]
    fn snapshot_reflects_current_phase() {
        let mut seq = PhaseSequencer::meditation(&PhaseCatalog::new(), "kundalini");
        seq.start();
        seq.skip_forward();
        seq.tick();
        let snap = seq.snapshot();
        assert_eq!(snap.list_key, "kundalini");
        assert_eq!(snap.state, RunState::Running);
        assert_eq!(snap.phase_index, 1);
        assert_eq!(snap.phase_number, 2);
        assert_eq!(snap.phase_count, 4);
        assert_eq!(snap.phase_label, "Dancing");
        assert_eq!(snap.remaining_secs, 15 * 60 - 1);
        assert_eq!(snap.elapsed_secs, 1);
        assert_eq!(snap.progress_fraction, 0.25);
        assert!(snap.phase_started_at.is_some());
    }

    #[test]
    fn meditation_starts_idle_like_new() {
        let catalog = PhaseCatalog::new();
        let built = PhaseSequencer::meditation(&catalog, "dynamic");
        let direct = PhaseSequencer::new(catalog.meditation("dynamic").clone(), 1).unwrap();
        assert_eq!(built.snapshot(), direct.snapshot());
        assert_eq!(built.state(), RunState::Idle);
        assert_eq!(built.remaining_secs(), 600);
        assert_eq!(built.phase_number(), 1);
    }

    #[test]
    fn total_secs_covers_all_rounds() {
        let seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "box", Some(3)).unwrap();
        assert_eq!(seq.total_secs(), 16 * 3);
    }
}
