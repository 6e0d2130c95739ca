//! Event delivery: the imperative shell around [`PowerMachine`].
//!
//! The dispatcher owns the inbox and the deferred queue and processes one
//! event at a time, to completion:
//!
//! 1. the machine applies the event and returns effects (and maybe an
//!    [`Attempt`]),
//! 2. the effects run against the collaborators and the timer driver,
//! 3. an attempt is performed and its result settled, repeating 2,
//! 4. if the state changed, deferred events move to the front of the inbox
//!    in the order they arrived.
//!
//! Deferred events are never replayed from inside the handler that caused
//! the state change, only once it has returned.

use crate::config::{SequencerConfig, TimeoutConfig};
use crate::core::{
    Event, HardwareStatus, PendingFlags, PowerState, StateHistory, TimerKind, UnknownStatus,
};
use crate::effects::{Attempt, Disposition, Effect, Outcome, PowerMachine};
use crate::shell::notify::notify_state_change;
use crate::shell::ports::{Collaborators, PropertiesPort, ServicePort, VendorPort};
use crate::snapshot::Snapshot;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// What happened to one delivered item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The machine saw the event.
    Processed {
        event: Event,
        disposition: Disposition,
        from: PowerState,
        to: PowerState,
    },
    /// A timer firing that was disarmed or re-armed after it was queued.
    StaleTimer { kind: TimerKind, generation: u64 },
    /// A submitted timeout for a timer that is not armed.
    UnarmedTimeout { kind: TimerKind },
    /// Collaborators are gone; the event was dropped.
    Unavailable { event: Event },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Envelope {
    Event(Event),
    Timer { kind: TimerKind, generation: u64 },
}

struct Live {
    service: Arc<dyn ServicePort>,
    properties: Arc<dyn PropertiesPort>,
    vendor: Arc<dyn VendorPort>,
}

/// Single-threaded event loop around a [`PowerMachine`].
pub struct Dispatcher<T> {
    machine: PowerMachine,
    collaborators: Collaborators,
    timers: T,
    timeouts: TimeoutConfig,
    inbox: VecDeque<Envelope>,
    deferred: VecDeque<Event>,
    halted: bool,
}

impl<T: crate::shell::TimerDriver> Dispatcher<T> {
    pub fn new(collaborators: Collaborators, timers: T, config: &SequencerConfig) -> Self {
        Self {
            machine: PowerMachine::with_history_limit(config.history_limit),
            collaborators,
            timers,
            timeouts: config.timeouts.clone(),
            inbox: VecDeque::new(),
            deferred: VecDeque::new(),
            halted: false,
        }
    }

    /// Queue an event. Nothing is processed until [`process_next`](Self::process_next)
    /// or [`run_until_idle`](Self::run_until_idle).
    ///
    /// A submitted [`Event::Timeout`] only counts while that timer is armed;
    /// otherwise it is dropped when it reaches the front of the inbox.
    pub fn submit(&mut self, event: Event) {
        self.inbox.push_back(Envelope::Event(event));
    }

    /// Translate a raw hardware status and queue the matching event.
    ///
    /// Unknown codes are logged and dropped.
    pub fn on_hardware_status(&mut self, raw: u8) -> Result<(), UnknownStatus> {
        match HardwareStatus::try_from(raw) {
            Ok(status) => {
                self.submit(status.into_event());
                Ok(())
            }
            Err(err) => {
                error!(%err, "incorrect status in state callback");
                Err(err)
            }
        }
    }

    /// Queue a timer firing armed under `generation`.
    pub fn timer_fired(&mut self, kind: TimerKind, generation: u64) {
        self.inbox.push_back(Envelope::Timer { kind, generation });
    }

    /// Queue a firing of `kind` if it is currently armed. Returns whether
    /// anything was queued.
    pub fn fire_timer(&mut self, kind: TimerKind) -> bool {
        match self.machine.timers().generation(kind) {
            Some(generation) => {
                self.timer_fired(kind, generation);
                true
            }
            None => false,
        }
    }

    /// Release the collaborators. Later events are dropped.
    pub fn cleanup(&mut self) {
        self.collaborators.release();
    }

    /// Process queued items until the inbox is empty. Returns how many were
    /// taken off the queue.
    pub fn run_until_idle(&mut self) -> usize {
        let mut count = 0;
        while self.process_next().is_some() {
            count += 1;
        }
        count
    }

    /// Take one item off the inbox and process it to completion.
    ///
    /// Returns `None` when the inbox is empty or the dispatcher has halted.
    pub fn process_next(&mut self) -> Option<Delivery> {
        if self.halted {
            self.inbox.clear();
            return None;
        }

        let event = match self.inbox.pop_front()? {
            Envelope::Event(Event::Timeout(kind)) if !self.machine.timers().is_armed(kind) => {
                debug!(timer = %kind, "dropping timeout for a timer that is not armed");
                return Some(Delivery::UnarmedTimeout { kind });
            }
            Envelope::Event(event) => event,
            Envelope::Timer { kind, generation } => {
                if !self.machine.timers().is_current(kind, generation) {
                    debug!(timer = %kind, generation, "dropping stale timer firing");
                    return Some(Delivery::StaleTimer { kind, generation });
                }
                Event::Timeout(kind)
            }
        };

        let (Some(service), Some(properties), Some(vendor)) = (
            self.collaborators.service(),
            self.collaborators.properties(),
            self.collaborators.vendor(),
        ) else {
            error!(
                state = %self.machine.state(),
                %event,
                "received event after cleanup"
            );
            return Some(Delivery::Unavailable { event });
        };
        let live = Live {
            service,
            properties,
            vendor,
        };

        if let Event::Timeout(kind) = event {
            self.timers.disarm(kind);
        }

        let from = self.machine.state();
        let mut outcome = self.machine.handle(event);
        let disposition = outcome.disposition;

        match disposition {
            Disposition::Deferred => {
                info!(%event, flags = %self.machine.flags(), "deferring request");
                self.deferred.push_back(event);
            }
            Disposition::Unhandled => {
                debug!(state = %from, %event, "event not handled in this state");
            }
            Disposition::Handled | Disposition::Ignored => {}
        }

        loop {
            self.execute(&live, &outcome);
            if self.halted {
                break;
            }
            let Some(attempt) = outcome.attempt else {
                break;
            };
            let succeeded = self.perform(&live, attempt);
            outcome = self.machine.settle(attempt, succeeded);
        }

        let to = self.machine.state();
        if self.halted {
            for kind in TimerKind::ALL {
                self.timers.disarm(kind);
            }
            self.inbox.clear();
            self.deferred.clear();
        } else if to != from && !self.deferred.is_empty() {
            debug!(count = self.deferred.len(), "replaying deferred events");
            while let Some(deferred) = self.deferred.pop_back() {
                self.inbox.push_front(Envelope::Event(deferred));
            }
        }

        Some(Delivery::Processed {
            event,
            disposition,
            from,
            to,
        })
    }

    fn execute(&mut self, live: &Live, outcome: &Outcome) {
        for effect in &outcome.effects {
            trace!(?effect, "executing effect");
            match *effect {
                Effect::Notify(state) => notify_state_change(&self.collaborators, state),
                Effect::ArmTimer(kind) => match self.machine.timers().generation(kind) {
                    Some(generation) => {
                        self.timers.arm(kind, generation, self.timeouts.delay(kind))
                    }
                    None => debug!(timer = %kind, "timer disarmed before it was scheduled"),
                },
                Effect::DisarmTimer(kind) => self.timers.disarm(kind),
                Effect::StartLayer1Bringup => live.service.start_layer1_bringup(),
                Effect::StartProfileServices => live.service.start_profile_services(),
                Effect::StopProfileServices => live.service.stop_profile_services(),
                Effect::DisableProfileServices => live.service.disable_profile_services(),
                Effect::StopLowPowerOnlyServices => {
                    live.service.stop_low_power_only_services();
                }
                Effect::UpdateUuids => live.service.update_uuids(),
                Effect::ClearDisableGuard => live.properties.clear_disable_guard(),
                Effect::ReadyForUse => live.properties.on_ready_for_use(),
                Effect::FullDisableRequested => live.properties.on_full_disable_requested(),
                Effect::LowPowerDisableRequested => {
                    live.properties.on_low_power_disable_requested()
                }
                Effect::TeardownCleanup => {
                    info!("running vendor teardown cleanup");
                    live.vendor.run_teardown_cleanup();
                }
                Effect::FatalRecovery { cause } => {
                    error!(timer = %cause, "requesting process restart to recover");
                    live.service.request_process_restart();
                    self.halted = true;
                    break;
                }
            }
        }
    }

    fn perform(&mut self, live: &Live, attempt: Attempt) -> bool {
        match attempt {
            Attempt::EnableFull => {
                let restricted = live.service.is_restricted_user();
                live.service.enable_full(restricted)
            }
            Attempt::DisableFull => live.service.disable_full(),
            Attempt::StopLowPowerOnlyServices => {
                let stopping = live.service.stop_low_power_only_services();
                if stopping {
                    debug!("stopping low-power services that were post enabled");
                }
                stopping
            }
        }
    }

    pub fn state(&self) -> PowerState {
        self.machine.state()
    }

    pub fn flags(&self) -> PendingFlags {
        self.machine.flags()
    }

    pub fn armed_timers(&self) -> Vec<TimerKind> {
        self.machine.timers().armed().collect()
    }

    pub fn history(&self) -> &StateHistory<PowerState> {
        self.machine.history()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn pending_len(&self) -> usize {
        self.inbox.len()
    }

    /// Fatal recovery ran; nothing more will be processed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    /// Capture the current state for diagnostics.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.machine.state(),
            self.machine.flags(),
            self.armed_timers(),
            self.deferred.len(),
            self.halted,
            self.machine.history().clone(),
        )
    }
}
