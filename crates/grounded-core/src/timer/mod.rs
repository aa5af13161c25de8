mod catalog;
pub mod driver;
mod phase;
mod sequencer;

pub use catalog::{PhaseCatalog, DEFAULT_BREATHWORK, GENERIC_MEDITATION};
pub use driver::{SessionDriver, SessionHandle, DEFAULT_TICK};
pub use phase::{BreathKind, MeditationStep, Phase, PhaseKind, PhaseList};
pub use sequencer::{PhaseSequencer, RunState, DEFAULT_BREATHWORK_ROUNDS};
