//! Property and scenario tests for the phase sequencer.
//!
//! Drives sequencers built from arbitrary phase lists through skip, tick and
//! pause sequences and checks the run-state invariants hold.

use grounded_core::{
    BreathKind, EntryCause, Event, MeditationStep, Phase, PhaseCatalog, PhaseList, PhaseSequencer,
    RunState,
};
use proptest::prelude::*;

fn breath_list(durations: &[u64]) -> PhaseList<BreathKind> {
    let kinds = [BreathKind::Inhale, BreathKind::Hold, BreathKind::Exhale];
    let phases = durations
        .iter()
        .enumerate()
        .map(|(i, &secs)| Phase::new(kinds[i % kinds.len()], secs, format!("step {i}")))
        .collect();
    PhaseList::new("generated", "Generated", "", phases).unwrap()
}

fn count_completed<K>(events: &[Option<Event<K>>]) -> usize {
    events
        .iter()
        .filter(|e| e.as_ref().is_some_and(Event::is_completed))
        .count()
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Tick,
    Skip,
    Pause,
    Resume,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Tick),
        2 => Just(Op::Skip),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
    ]
}

proptest! {
    #[test]
    fn skipping_every_phase_completes_exactly_once(
        durations in prop::collection::vec(1u64..30, 1..6),
        rounds in 1u32..6,
    ) {
        let list = breath_list(&durations);
        let len = list.len();
        let mut seq = PhaseSequencer::new(list, rounds).unwrap();
        seq.start();

        let skips = len * rounds as usize;
        let events: Vec<_> = (0..skips).map(|_| seq.skip_forward()).collect();

        prop_assert_eq!(seq.state(), RunState::Completed);
        prop_assert_eq!(count_completed(&events), 1);
        prop_assert!(events.last().unwrap().as_ref().unwrap().is_completed());
        // Nothing moves afterwards.
        prop_assert!(seq.skip_forward().is_none());
        prop_assert!(seq.tick().is_none());
        prop_assert_eq!(seq.state(), RunState::Completed);
    }

    #[test]
    fn one_skip_short_is_still_running(
        durations in prop::collection::vec(1u64..30, 1..6),
        rounds in 1u32..6,
    ) {
        let list = breath_list(&durations);
        let len = list.len();
        let mut seq = PhaseSequencer::new(list, rounds).unwrap();
        seq.start();
        for _ in 0..(len * rounds as usize - 1) {
            seq.skip_forward();
        }
        prop_assert_eq!(seq.state(), RunState::Running);
        prop_assert_eq!(seq.round(), rounds);
        prop_assert_eq!(seq.phase_index(), len - 1);
    }

    #[test]
    fn progress_never_decreases_without_rewind(
        durations in prop::collection::vec(1u64..8, 1..5),
        rounds in 1u32..4,
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut seq = PhaseSequencer::new(breath_list(&durations), rounds).unwrap();
        seq.start();
        let mut last = seq.progress_fraction();
        let mut completions = 0;

        for op in ops {
            let event = match op {
                Op::Tick => seq.tick(),
                Op::Skip => seq.skip_forward(),
                Op::Pause => seq.pause(),
                Op::Resume => seq.resume(),
            };
            if event.as_ref().is_some_and(Event::is_completed) {
                completions += 1;
            }

            let progress = seq.progress_fraction();
            prop_assert!(progress >= last);
            prop_assert_eq!(progress == 1.0, seq.state() == RunState::Completed);
            prop_assert!(seq.remaining_secs() <= seq.current_phase().duration_secs);
            if seq.state() != RunState::Completed {
                prop_assert!(seq.phase_index() < durations.len());
                prop_assert!((1..=rounds).contains(&seq.round()));
            }
            last = progress;
        }
        prop_assert!(completions <= 1);
    }

    #[test]
    fn pause_resume_preserves_position(
        durations in prop::collection::vec(2u64..20, 1..5),
        ticks in 0usize..40,
    ) {
        let mut seq = PhaseSequencer::new(breath_list(&durations), 3).unwrap();
        seq.start();
        for _ in 0..ticks {
            seq.tick();
        }
        prop_assume!(seq.state() == RunState::Running);

        let before = seq.snapshot();
        prop_assert!(seq.pause().is_some());
        prop_assert!(seq.resume().is_some());
        let after = seq.snapshot();

        prop_assert_eq!(after.state, before.state);
        prop_assert_eq!(after.remaining_secs, before.remaining_secs);
        prop_assert_eq!(after.round, before.round);
        prop_assert_eq!(after.phase_index, before.phase_index);
    }
}

#[test]
fn skip_backward_at_very_first_phase_is_a_no_op() {
    let mut seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "morning", None).unwrap();
    seq.start();
    seq.tick();
    assert!(seq.skip_backward().is_none());
    assert_eq!((seq.round(), seq.phase_index(), seq.remaining_secs()), (1, 0, 3));
}

#[test]
fn skip_backward_crosses_round_boundary() {
    let mut seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "morning", None).unwrap();
    seq.start();
    for _ in 0..3 {
        seq.skip_forward();
    }
    assert_eq!((seq.round(), seq.phase_index()), (2, 0));

    let event = seq.skip_backward().unwrap();
    assert!(matches!(
        event,
        Event::PhaseEntered {
            cause: EntryCause::Rewind,
            round: 1,
            phase_index: 2,
            kind: BreathKind::Exhale,
            duration_secs: 6,
            ..
        }
    ));
    assert_eq!((seq.round(), seq.phase_index(), seq.remaining_secs()), (1, 2, 6));
}

#[test]
fn skip_backward_within_round_restores_full_duration() {
    let mut seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "box", Some(2)).unwrap();
    seq.start();
    seq.skip_forward();
    seq.skip_forward();
    seq.tick();
    assert_eq!(seq.remaining_secs(), 3);

    seq.skip_backward();
    assert_eq!(seq.phase_index(), 1);
    assert_eq!(seq.remaining_secs(), 4);
    assert_eq!(seq.current_phase().kind, BreathKind::Hold);
}

#[test]
fn morning_breath_five_rounds_walkthrough() {
    let mut seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "morning", None).unwrap();
    assert_eq!(seq.total_rounds(), 5);
    assert_eq!(seq.total_secs(), 60);

    seq.start();
    assert_eq!((seq.round(), seq.phase_index(), seq.remaining_secs()), (1, 0, 4));

    for _ in 0..4 {
        seq.tick();
    }
    assert_eq!((seq.phase_index(), seq.remaining_secs()), (1, 2));

    for _ in 0..2 {
        seq.tick();
    }
    assert_eq!((seq.phase_index(), seq.remaining_secs()), (2, 6));

    for _ in 0..6 {
        seq.tick();
    }
    assert_eq!((seq.round(), seq.phase_index(), seq.remaining_secs()), (2, 0, 4));

    let events: Vec<_> = (0..12).map(|_| seq.skip_forward()).collect();
    assert_eq!(seq.state(), RunState::Completed);
    assert_eq!(count_completed(&events), 1);
    assert_eq!(seq.progress_fraction(), 1.0);
}

#[test]
fn dynamic_meditation_walkthrough() {
    let mut seq = PhaseSequencer::meditation(&PhaseCatalog::new(), "dynamic");
    assert_eq!(seq.total_rounds(), 1);
    assert_eq!(seq.total_secs(), 60 * 60);

    seq.start();
    assert_eq!(seq.remaining_secs(), 600);
    for _ in 0..4 {
        seq.skip_forward();
    }
    assert_eq!(seq.phase_index(), 4);
    assert_eq!(seq.state(), RunState::Running);
    assert_eq!(seq.current_phase().kind, MeditationStep::new("Celebration"));
    assert_eq!(seq.remaining_secs(), 900);

    assert!(seq.skip_forward().unwrap().is_completed());
    assert_eq!(seq.state(), RunState::Completed);
}

#[test]
fn unknown_keys_fall_back() {
    let catalog = PhaseCatalog::new();
    let breath = PhaseSequencer::breathwork(&catalog, "does-not-exist", Some(1)).unwrap();
    assert_eq!(breath.phase_list().key(), "morning");

    let meditation = PhaseSequencer::meditation(&catalog, "whirling");
    assert_eq!(meditation.phase_list().len(), 1);
    assert_eq!(meditation.current_phase().prompt, "Breathe and relax");
    assert_eq!(meditation.total_secs(), 600);
}

#[test]
fn stop_returns_to_idle_from_anywhere() {
    let mut seq = PhaseSequencer::breathwork(&PhaseCatalog::new(), "calm", Some(2)).unwrap();
    seq.start();
    seq.skip_forward();
    seq.pause();
    assert!(matches!(seq.stop(), Some(Event::Stopped { .. })));
    assert_eq!(seq.state(), RunState::Idle);
    assert_eq!((seq.round(), seq.phase_index(), seq.remaining_secs()), (0, 0, 4));
    assert_eq!(seq.progress_fraction(), 0.0);

    // A stopped session can be run again.
    assert!(seq.start().is_some());
}
