//! The power machine: applies pure transitions and keeps the bookkeeping.

use crate::core::{
    Event, PendingFlags, PowerState, Recovery, StateHistory, StateTransition, TimerSet,
};
use crate::effects::effect::{Attempt, Effect};
use crate::effects::transition::{self, Disposition, Transition};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Result of applying one transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub disposition: Disposition,
    pub from: PowerState,
    pub to: PowerState,
    /// Effects to execute, entry actions included.
    pub effects: Vec<Effect>,
    pub attempt: Option<Attempt>,
}

impl Outcome {
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Owns the power state, the in-flight flags, the armed timers and the
/// history. It never talks to collaborators: [`handle`](Self::handle) and
/// [`settle`](Self::settle) return what must happen, and the caller makes it
/// happen.
#[derive(Clone, Debug)]
pub struct PowerMachine {
    state: PowerState,
    flags: PendingFlags,
    timers: TimerSet,
    history: StateHistory<PowerState>,
}

impl Default for PowerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerMachine {
    /// Create a machine in [`PowerState::Off`] with unbounded history.
    pub fn new() -> Self {
        Self::with_history(StateHistory::new())
    }

    /// Create a machine in [`PowerState::Off`] keeping at most `limit`
    /// transitions of history.
    pub fn with_history_limit(limit: usize) -> Self {
        Self::with_history(StateHistory::with_limit(limit))
    }

    fn with_history(history: StateHistory<PowerState>) -> Self {
        Self {
            state: PowerState::Off,
            flags: PendingFlags::CLEAR,
            timers: TimerSet::new(),
            history,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn flags(&self) -> PendingFlags {
        self.flags
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn history(&self) -> &StateHistory<PowerState> {
        &self.history
    }

    /// Apply one event.
    pub fn handle(&mut self, event: Event) -> Outcome {
        if let Event::Timeout(kind) = event {
            // The firing consumes the timer.
            self.timers.disarm(kind);
        }

        debug!(
            state = %self.state,
            %event,
            flags = %self.flags,
            "processing event"
        );

        let transition = transition::transition(self.state, self.flags, event);

        if let (Event::Timeout(kind), Disposition::Handled) = (event, transition.disposition) {
            match kind.recovery() {
                Recovery::Fatal => error!(timer = %kind, "step timed out, hardware state is unverifiable"),
                Recovery::Recoverable => warn!(timer = %kind, "step timed out, continuing"),
            }
        }

        self.apply(transition, event.name())
    }

    /// Feed back the result of the attempt returned by the last outcome.
    pub fn settle(&mut self, attempt: Attempt, succeeded: bool) -> Outcome {
        if !succeeded {
            error!(attempt = attempt.name(), "collaborator call failed");
        }
        let transition = transition::settle(self.flags, attempt, succeeded);
        self.apply(transition, attempt.name())
    }

    fn apply(&mut self, transition: Transition, trigger: &str) -> Outcome {
        let from = self.state;
        let to = transition.next_state(from);
        let mut effects = transition.effects;
        self.flags = transition.flags;

        for effect in &effects {
            match effect {
                Effect::ArmTimer(kind) => {
                    if let Err(err) = self.timers.arm(*kind) {
                        error!(%err, "timer armed twice");
                        debug_assert!(false, "{err}");
                    }
                }
                Effect::DisarmTimer(kind) => {
                    self.timers.disarm(*kind);
                }
                _ => {}
            }
        }

        if to != from {
            if to != PowerState::Pending {
                let leftover: Vec<_> = self.timers.armed().collect();
                for kind in leftover {
                    warn!(timer = %kind, state = %to, "disarming timer left armed outside Pending");
                    self.timers.disarm(kind);
                    effects.push(Effect::DisarmTimer(kind));
                }
                if !self.flags.is_clear() {
                    warn!(flags = %self.flags, state = %to, "clearing flags left set outside Pending");
                    self.flags = PendingFlags::CLEAR;
                }
            }

            self.state = to;
            self.history = self.history.record(StateTransition {
                from,
                to,
                trigger: trigger.to_string(),
                timestamp: Utc::now(),
            });
            info!(state = %to, "entering state");
            effects.extend(transition::on_enter(to));
        }

        Outcome {
            disposition: transition.disposition,
            from,
            to,
            effects,
            attempt: transition.attempt,
        }
    }
}
