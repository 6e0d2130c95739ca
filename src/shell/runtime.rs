//! Async runtime: a [`Dispatcher`] driven by a tokio task.
//!
//! Every input (requests, hardware callbacks, timer firings) goes through one
//! unbounded channel, so the task sees them in a single order and handles
//! each to completion before taking the next. Callers never block: they hold
//! a cheap [`SequencerHandle`].

use crate::config::SequencerConfig;
use crate::core::{Event, HardwareStatus, TimerKind};
use crate::error::{Error, Result};
use crate::shell::dispatcher::Dispatcher;
use crate::shell::ports::Collaborators;
use crate::shell::timers::TokioTimers;
use crate::snapshot::Snapshot;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

pub(crate) enum Command {
    Event(Event),
    TimerFired { kind: TimerKind, generation: u64 },
    Cleanup,
    Snapshot(oneshot::Sender<Snapshot>),
}

/// Start a sequencer on the current tokio runtime.
///
/// The task stops after fatal recovery, or once every handle is dropped.
pub(crate) fn spawn(collaborators: Collaborators, config: &SequencerConfig) -> SequencerHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let timers = TokioTimers::new(tx.downgrade());
    let dispatcher = Dispatcher::new(collaborators, timers, config);
    tokio::spawn(run(dispatcher, rx));
    SequencerHandle { tx }
}

async fn run(mut dispatcher: Dispatcher<TokioTimers>, mut rx: UnboundedReceiver<Command>) {
    info!("sequencer started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Event(event) => dispatcher.submit(event),
            Command::TimerFired { kind, generation } => dispatcher.timer_fired(kind, generation),
            Command::Cleanup => {
                debug!("releasing collaborators");
                dispatcher.cleanup();
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(dispatcher.snapshot());
            }
        }
        dispatcher.run_until_idle();
        if dispatcher.is_halted() {
            error!(state = %dispatcher.state(), "sequencer halted after fatal recovery");
            break;
        }
    }
    info!("sequencer stopped");
}

/// Cloneable handle to a running sequencer.
#[derive(Clone, Debug)]
pub struct SequencerHandle {
    tx: UnboundedSender<Command>,
}

impl SequencerHandle {
    /// Queue an event. Returns immediately.
    pub fn submit(&self, event: Event) -> Result<()> {
        self.send(Command::Event(event))
    }

    pub fn request_layer1_on(&self) -> Result<()> {
        self.submit(Event::RequestLayer1On)
    }

    pub fn request_layer2_on(&self) -> Result<()> {
        self.submit(Event::RequestLayer2On)
    }

    pub fn request_layer2_off(&self) -> Result<()> {
        self.submit(Event::RequestLayer2Off)
    }

    pub fn request_all_off(&self) -> Result<()> {
        self.submit(Event::RequestAllOff)
    }

    /// Hardware state callback. Unknown codes are logged and rejected
    /// without reaching the machine.
    pub fn on_hardware_status(&self, raw: u8) -> Result<()> {
        let status = HardwareStatus::try_from(raw).map_err(|err| {
            error!(%err, "incorrect status in state callback");
            err
        })?;
        self.submit(status.into_event())
    }

    /// Release the collaborators. Events already queued behind this are
    /// dropped.
    pub fn cleanup(&self) -> Result<()> {
        self.send(Command::Cleanup)
    }

    /// Capture a diagnostic snapshot once everything queued before it has
    /// been processed.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        response.await.map_err(|_| Error::Closed)
    }

    /// Resolves when the sequencer task has stopped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::Closed)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event) => write!(f, "Event({event})"),
            Self::TimerFired { kind, generation } => write!(f, "TimerFired({kind}, {generation})"),
            Self::Cleanup => f.write_str("Cleanup"),
            Self::Snapshot(_) => f.write_str("Snapshot"),
        }
    }
}
