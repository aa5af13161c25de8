use std::time::Duration;

use clap::{Args, Subcommand};
use grounded_core::activity;
use grounded_core::storage::progress::today;
use grounded_core::{
    Config, Database, PhaseCatalog, PhaseKind, PhaseSequencer, ProgressTracker, SessionDriver,
};
use serde::Serialize;

use super::CmdResult;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a breathwork session, printing each event as a JSON line
    Breathwork {
        /// Pattern key (defaults to breathwork.default_pattern)
        #[arg(long)]
        pattern: Option<String>,
        /// Number of rounds (defaults to breathwork.rounds)
        #[arg(long)]
        rounds: Option<u32>,
        #[command(flatten)]
        run: RunOptions,
    },
    /// Run a meditation session, printing each event as a JSON line
    Meditation {
        /// Technique key (defaults to meditation.default_technique)
        #[arg(long)]
        technique: Option<String>,
        #[command(flatten)]
        run: RunOptions,
    },
    /// Show phase and time totals without running
    Plan {
        #[command(subcommand)]
        kind: PlanKind,
    },
}

#[derive(Args)]
pub struct RunOptions {
    /// Wall-clock milliseconds per session second (defaults to session.tick_millis)
    #[arg(long)]
    tick_millis: Option<u64>,
    /// Do not record the activity when the session completes
    #[arg(long)]
    no_record: bool,
}

#[derive(Subcommand)]
pub enum PlanKind {
    Breathwork {
        key: String,
        #[arg(long)]
        rounds: Option<u32>,
    },
    Meditation {
        key: String,
    },
}

#[derive(Serialize)]
struct Plan<'a> {
    key: &'a str,
    name: &'a str,
    phases_per_round: usize,
    rounds: u32,
    total_phases: usize,
    total_secs: u64,
}

impl<'a> Plan<'a> {
    fn of<K: PhaseKind>(seq: &'a PhaseSequencer<K>) -> Self {
        let list = seq.phase_list();
        Self {
            key: list.key(),
            name: list.name(),
            phases_per_round: list.len(),
            rounds: seq.total_rounds(),
            total_phases: list.len() * seq.total_rounds() as usize,
            total_secs: seq.total_secs(),
        }
    }
}

pub fn run(action: SessionAction) -> CmdResult {
    let config = Config::load_or_default();
    let catalog = PhaseCatalog::new();

    match action {
        SessionAction::Breathwork {
            pattern,
            rounds,
            run,
        } => {
            let pattern = pattern.unwrap_or_else(|| config.breathwork.default_pattern.clone());
            let rounds = rounds.unwrap_or(config.breathwork.rounds);
            let seq = PhaseSequencer::breathwork(&catalog, &pattern, Some(rounds))?;
            let completed = run_live(seq, tick_period(&run, &config))?;
            if completed && !run.no_record {
                record(activity::activity_for_breathwork())?;
            }
        }
        SessionAction::Meditation { technique, run } => {
            let technique = technique.unwrap_or_else(|| config.meditation.default_technique.clone());
            let seq = PhaseSequencer::meditation(&catalog, &technique);
            let completed = run_live(seq, tick_period(&run, &config))?;
            if completed && !run.no_record {
                match activity::activity_for_meditation(&technique) {
                    Some(id) => record(id)?,
                    None => tracing::info!(technique = %technique, "no daily activity for this technique"),
                }
            }
        }
        SessionAction::Plan { kind } => match kind {
            PlanKind::Breathwork { key, rounds } => {
                let seq = PhaseSequencer::breathwork(&catalog, &key, rounds)?;
                println!("{}", serde_json::to_string_pretty(&Plan::of(&seq))?);
            }
            PlanKind::Meditation { key } => {
                let seq = PhaseSequencer::meditation(&catalog, &key);
                println!("{}", serde_json::to_string_pretty(&Plan::of(&seq))?);
            }
        },
    }
    Ok(())
}

fn tick_period(run: &RunOptions, config: &Config) -> Duration {
    Duration::from_millis(run.tick_millis.unwrap_or(config.session.tick_millis).max(1))
}

/// Drive a session to completion or Ctrl-C. Returns whether it completed.
fn run_live<K: PhaseKind + Serialize>(
    seq: PhaseSequencer<K>,
    period: Duration,
) -> Result<bool, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(seq, period))
}

async fn drive<K: PhaseKind + Serialize>(
    seq: PhaseSequencer<K>,
    period: Duration,
) -> Result<bool, Box<dyn std::error::Error>> {
    let (handle, mut events) = SessionDriver::spawn(seq, period);
    handle.start();

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let completed = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break false };
                println!("{}", serde_json::to_string(&event)?);
                if event.is_completed() {
                    break true;
                }
            }
            _ = &mut interrupt => {
                tracing::info!("interrupted, stopping session");
                break false;
            }
        }
    };

    handle.stop().await;
    while let Some(event) = events.recv().await {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(completed)
}

fn record(activity_id: &str) -> CmdResult {
    let tracker = ProgressTracker::new(Database::open()?);
    let date = today();
    let newly = tracker.complete_activity(activity_id, date)?;
    tracker.update_last_active(date)?;
    let line = serde_json::json!({
        "type": "Recorded",
        "activity_id": activity_id,
        "newly_recorded": newly,
    });
    println!("{line}");
    Ok(())
}
