//! Timer drivers.
//!
//! The machine decides *which* timers are armed; a [`TimerDriver`] makes
//! them fire. Firings come back to the dispatcher stamped with the
//! generation they were armed under, so a firing that races a disarm is
//! recognised as stale and dropped.

use crate::core::TimerKind;
use crate::shell::runtime::Command;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

/// Schedules and cancels timer firings.
pub trait TimerDriver {
    /// Fire `kind` with `generation` after `delay`, replacing any pending
    /// firing of the same kind.
    fn arm(&mut self, kind: TimerKind, generation: u64, delay: Duration);

    /// Cancel `kind`. Cancelling a fired or never-armed timer is a no-op.
    fn disarm(&mut self, kind: TimerKind);
}

/// Timers backed by tokio sleeps that post firings back to the sequencer
/// task.
pub(crate) struct TokioTimers {
    sender: WeakUnboundedSender<Command>,
    tasks: HashMap<TimerKind, JoinHandle<()>>,
}

impl TokioTimers {
    pub(crate) fn new(sender: WeakUnboundedSender<Command>) -> Self {
        Self {
            sender,
            tasks: HashMap::new(),
        }
    }
}

impl TimerDriver for TokioTimers {
    fn arm(&mut self, kind: TimerKind, generation: u64, delay: Duration) {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(Command::TimerFired { kind, generation });
            }
        });
        if let Some(previous) = self.tasks.insert(kind, task) {
            previous.abort();
        }
        trace!(timer = %kind, generation, ?delay, "timer armed");
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(task) = self.tasks.remove(&kind) {
            task.abort();
            trace!(timer = %kind, "timer disarmed");
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// A timer armed on a [`ManualTimers`] driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub generation: u64,
    pub delay: Duration,
}

/// A driver that only records what is armed.
///
/// For hosts that run their own timer substrate, and for tests: read
/// [`armed`](Self::armed) and hand firings to
/// [`Dispatcher::timer_fired`](crate::shell::Dispatcher::timer_fired) when due.
#[derive(Clone, Debug, Default)]
pub struct ManualTimers {
    armed: Vec<ArmedTimer>,
    replaced: usize,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> &[ArmedTimer] {
        &self.armed
    }

    pub fn get(&self, kind: TimerKind) -> Option<ArmedTimer> {
        self.armed.iter().copied().find(|timer| timer.kind == kind)
    }

    /// How many times a kind was armed while a firing of it was still
    /// pending.
    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

impl TimerDriver for ManualTimers {
    fn arm(&mut self, kind: TimerKind, generation: u64, delay: Duration) {
        if let Some(existing) = self.armed.iter_mut().find(|timer| timer.kind == kind) {
            self.replaced += 1;
            *existing = ArmedTimer {
                kind,
                generation,
                delay,
            };
        } else {
            self.armed.push(ArmedTimer {
                kind,
                generation,
                delay,
            });
        }
    }

    fn disarm(&mut self, kind: TimerKind) {
        self.armed.retain(|timer| timer.kind != kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timers_track_arm_and_disarm() {
        let mut timers = ManualTimers::new();
        timers.arm(TimerKind::Enable, 3, Duration::from_secs(12));

        assert_eq!(
            timers.get(TimerKind::Enable),
            Some(ArmedTimer {
                kind: TimerKind::Enable,
                generation: 3,
                delay: Duration::from_secs(12),
            })
        );

        timers.disarm(TimerKind::Enable);
        timers.disarm(TimerKind::Enable);
        assert!(timers.armed().is_empty());
        assert_eq!(timers.replaced(), 0);
    }

    #[test]
    fn manual_timers_count_replacements() {
        let mut timers = ManualTimers::new();
        timers.arm(TimerKind::Cleanup, 0, Duration::from_secs(2));
        timers.arm(TimerKind::Cleanup, 1, Duration::from_secs(2));

        assert_eq!(timers.armed().len(), 1);
        assert_eq!(timers.get(TimerKind::Cleanup).map(|t| t.generation), Some(1));
        assert_eq!(timers.replaced(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_posts_firing() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(tx.downgrade());

        timers.arm(TimerKind::StopLayer2, 7, Duration::from_secs(4));

        match rx.recv().await {
            Some(Command::TimerFired { kind, generation }) => {
                assert_eq!(kind, TimerKind::StopLayer2);
                assert_eq!(generation, 7);
            }
            _ => panic!("expected a timer firing"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_tokio_timer_never_fires() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut timers = TokioTimers::new(tx.downgrade());

        timers.arm(TimerKind::Disable, 0, Duration::from_secs(8));
        timers.disarm(TimerKind::Disable);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
