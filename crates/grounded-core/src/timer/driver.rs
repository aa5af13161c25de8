//! Tick source for a [`PhaseSequencer`].
//!
//! One tokio task owns the sequencer. Control commands and clock ticks are
//! serialized through a single `select!` loop, so a tick can never race a
//! user action. The interval only exists while the session is running:
//! pausing drops it, resuming creates a fresh one, so the first decrement
//! after a resume lands one full period later.
//!
//! Dropping the [`SessionHandle`] aborts the task; no tick fires after
//! teardown.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval};

use super::phase::PhaseKind;
use super::sequencer::{PhaseSequencer, RunState};
use crate::events::{Event, SessionSnapshot};

/// One second, the resolution the session clock is specified in.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Command {
    Start,
    Pause,
    Resume,
    SkipForward,
    SkipBackward,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Stop(oneshot::Sender<SessionSnapshot>),
}

pub struct SessionDriver;

impl SessionDriver {
    /// Spawn the owning task on the current tokio runtime.
    ///
    /// `tick_period` is the wall-clock length of one sequencer second; tests
    /// and demos shrink it.
    pub fn spawn<K: PhaseKind>(
        sequencer: PhaseSequencer<K>,
        tick_period: Duration,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<Event<K>>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(sequencer, tick_period, cmd_rx, event_tx));
        (
            SessionHandle {
                commands: cmd_tx,
                task: Some(task),
            },
            event_rx,
        )
    }
}

/// Caller-side handle. Owns the driver task.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Returns `false` if the driver task is gone.
    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(Command::Resume)
    }

    pub fn skip_forward(&self) -> bool {
        self.send(Command::SkipForward)
    }

    pub fn skip_backward(&self) -> bool {
        self.send(Command::SkipBackward)
    }

    /// Current state, after every command queued before this call.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        if !self.send(Command::Snapshot(tx)) {
            return None;
        }
        rx.await.ok()
    }

    /// Stop the session and join the driver task.
    ///
    /// Returns the last snapshot taken before the reset to idle.
    pub async fn stop(mut self) -> Option<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        let last = if self.send(Command::Stop(tx)) {
            rx.await.ok()
        } else {
            None
        };
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("session driver task ended abnormally: {e}");
            }
        }
        last
    }

    fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<K: PhaseKind>(
    mut sequencer: PhaseSequencer<K>,
    tick_period: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event<K>>,
) {
    let mut ticker: Option<Interval> = None;

    loop {
        let event = tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("session handle dropped, driver exiting");
                    break;
                };
                let event = match command {
                    Command::Start => sequencer.start(),
                    Command::Pause => sequencer.pause(),
                    Command::Resume => sequencer.resume(),
                    Command::SkipForward => sequencer.skip_forward(),
                    Command::SkipBackward => sequencer.skip_backward(),
                    Command::Snapshot(reply) => {
                        let _ = reply.send(sequencer.snapshot());
                        None
                    }
                    Command::Stop(reply) => {
                        let last = sequencer.snapshot();
                        if let Some(event) = sequencer.stop() {
                            let _ = events.send(event);
                        }
                        let _ = reply.send(last);
                        break;
                    }
                };
                // A phase entered by command restarts the clock so the new
                // phase gets a full first second.
                if matches!(event, Some(Event::PhaseEntered { .. })) {
                    ticker = None;
                }
                event
            }
            _ = next_tick(&mut ticker) => sequencer.tick(),
        };

        if let Some(event) = event {
            // Receiver may be gone; the session keeps its own state regardless.
            let _ = events.send(event);
        }

        match sequencer.state() {
            RunState::Running => {
                if ticker.is_none() {
                    ticker = Some(interval_at(Instant::now() + tick_period, tick_period));
                }
            }
            RunState::Idle | RunState::Paused | RunState::Completed => ticker = None,
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{BreathKind, PhaseCatalog};

    fn box_once() -> PhaseSequencer<BreathKind> {
        PhaseSequencer::breathwork(&PhaseCatalog::new(), "box", Some(1)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_before_start_is_idle() {
        let (handle, _events) = SessionDriver::spawn(box_once(), DEFAULT_TICK);
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.state, RunState::Idle);
        assert_eq!(snap.round, 0);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_closes_event_stream() {
        let (handle, mut events) = SessionDriver::spawn(box_once(), DEFAULT_TICK);
        handle.start();
        tokio::task::yield_now().await;
        drop(handle);
        let mut seen = 0;
        while events.recv().await.is_some() {
            seen += 1;
        }
        assert!(seen <= 1);
    }
}
