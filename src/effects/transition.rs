//! The transition table.
//!
//! Every function here is pure: given the current state, the in-flight
//! flags and an event, it returns the next state, the replacement flags and
//! the effects to run. Nothing is executed.

use crate::core::{Event, PendingFlags, PowerState, PublicState, Recovery, TimerKind};
use crate::effects::effect::{Attempt, Effect};

/// How an event was treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The event drove the machine.
    Handled,
    /// Already consistent with the request; nothing to do.
    Ignored,
    /// An opposing operation is in flight; replay after it resolves.
    Deferred,
    /// Not meaningful in the current state.
    Unhandled,
}

/// Output of the transition function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub disposition: Disposition,
    /// State to move to; `None` stays put.
    pub target: Option<PowerState>,
    /// Flags after the transition.
    pub flags: PendingFlags,
    /// Effects, in execution order.
    pub effects: Vec<Effect>,
    /// Performed after `effects`, result fed to [`settle`].
    pub attempt: Option<Attempt>,
}

impl Transition {
    fn with_disposition(disposition: Disposition, flags: PendingFlags) -> Self {
        Self {
            disposition,
            target: None,
            flags,
            effects: Vec::new(),
            attempt: None,
        }
    }

    fn handled(flags: PendingFlags) -> Self {
        Self::with_disposition(Disposition::Handled, flags)
    }

    fn ignored(flags: PendingFlags) -> Self {
        Self::with_disposition(Disposition::Ignored, flags)
    }

    fn deferred(flags: PendingFlags) -> Self {
        Self::with_disposition(Disposition::Deferred, flags)
    }

    fn unhandled(flags: PendingFlags) -> Self {
        Self::with_disposition(Disposition::Unhandled, flags)
    }

    fn to(mut self, state: PowerState) -> Self {
        self.target = Some(state);
        self
    }

    fn then(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn attempt(mut self, attempt: Attempt) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// The state after this transition, starting from `current`.
    pub fn next_state(&self, current: PowerState) -> PowerState {
        self.target.unwrap_or(current)
    }
}

/// Whether `event` opposes an operation in flight and must wait for it.
pub fn should_defer(event: Event, flags: PendingFlags) -> bool {
    match event {
        Event::RequestLayer1On | Event::RequestLayer2On => flags.any_turning_off(),
        Event::RequestLayer2Off | Event::RequestAllOff => flags.any_turning_on(),
        _ => false,
    }
}

/// Apply `event` to `(state, flags)`.
///
/// Completion events are only accepted while the operation they complete is
/// flagged as in flight.
pub fn transition(state: PowerState, flags: PendingFlags, event: Event) -> Transition {
    use PowerState::{Layer1On, Layer2On, Off, Pending};

    match (state, event) {
        (Off, Event::RequestLayer1On) => Transition::handled(flags.with_layer1_turning_on(true))
            .to(Pending)
            .then(Effect::Notify(PublicState::Layer1TurningOn))
            .then(Effect::ArmTimer(TimerKind::StartLayer1))
            .then(Effect::StartLayer1Bringup),
        (Off, Event::RequestAllOff) => Transition::ignored(flags),

        (Layer1On, Event::RequestLayer2On) => {
            Transition::handled(flags.with_layer2_turning_on(true))
                .to(Pending)
                .then(Effect::ClearDisableGuard)
                .then(Effect::Notify(PublicState::Layer2TurningOn))
                .then(Effect::ArmTimer(TimerKind::Enable))
                .then(Effect::StartProfileServices)
        }
        (Layer1On, Event::RequestAllOff) => {
            Transition::handled(flags.with_layer1_turning_off(true))
                .to(Pending)
                .then(Effect::Notify(PublicState::Layer1TurningOff))
                .then(Effect::LowPowerDisableRequested)
                .then(Effect::ArmTimer(TimerKind::Disable))
                .attempt(Attempt::DisableFull)
        }
        (Layer1On, Event::RequestLayer1On | Event::RequestLayer2Off) => Transition::ignored(flags),

        (Layer2On, Event::RequestLayer2Off) => {
            Transition::handled(flags.with_layer2_turning_off(true))
                .to(Pending)
                .then(Effect::Notify(PublicState::Layer2TurningOff))
                .then(Effect::ArmTimer(TimerKind::SetScanMode))
                .then(Effect::FullDisableRequested)
        }
        (Layer2On, Event::RequestLayer2On) => Transition::ignored(flags),

        (Pending, request) if request.is_request() => {
            if should_defer(request, flags) {
                Transition::deferred(flags)
            } else {
                Transition::ignored(flags)
            }
        }
        (Pending, Event::HardwareLayer1Started) if flags.layer1_turning_on() => {
            Transition::handled(flags.with_layer1_turning_on(false))
                .to(Layer1On)
                .then(Effect::DisarmTimer(TimerKind::StartLayer1))
                .then(Effect::Notify(PublicState::Layer1On))
        }
        (Pending, Event::HardwareLayer2Started) if flags.layer2_turning_on() => {
            Transition::handled(flags)
                .then(Effect::DisarmTimer(TimerKind::Enable))
                .attempt(Attempt::EnableFull)
        }
        (Pending, Event::HardwareEnabled) if flags.layer2_turning_on() => {
            Transition::handled(flags.with_layer2_turning_on(false))
                .to(Layer2On)
                .then(Effect::DisarmTimer(TimerKind::Enable))
                .then(Effect::ReadyForUse)
                .then(Effect::Notify(PublicState::Layer2On))
        }
        (Pending, Event::BeginTeardownCleanup) if flags.layer2_turning_off() => {
            begin_cleanup(Transition::handled(flags))
        }
        (Pending, Event::BeginDisable) if flags.layer2_turning_off() => {
            restart_timer(
                Transition::handled(flags).then(Effect::DisarmTimer(TimerKind::Cleanup)),
                TimerKind::StopLayer2,
            )
            .then(Effect::StopProfileServices)
        }
        (Pending, Event::AllDisabled) if flags.layer2_turning_on() => {
            // Hardware dropped out while the full layer was being enabled.
            Transition::handled(flags.with_layer2_turning_on(false))
                .to(Off)
                .then(Effect::DisarmTimer(TimerKind::Enable))
                .then(Effect::StopProfileServices)
                .then(Effect::Notify(PublicState::Off))
        }
        (Pending, Event::AllDisabled) => hardware_disabled(flags),
        (Pending, Event::Layer1Stopped) if flags.layer1_turning_off() => layer1_stopped(flags),
        (Pending, Event::Layer2Stopped) if flags.layer2_turning_off() => {
            Transition::handled(flags.with_layer2_turning_off(false))
                .to(Layer1On)
                .then(Effect::DisarmTimer(TimerKind::StopLayer2))
                .then(Effect::Notify(PublicState::Layer1On))
        }
        (Pending, Event::Timeout(kind)) => timed_out(flags, kind),

        _ => Transition::unhandled(flags),
    }
}

/// Follow-up to an [`Attempt`], given whether the collaborator call succeeded.
pub fn settle(flags: PendingFlags, attempt: Attempt, succeeded: bool) -> Transition {
    match (attempt, succeeded) {
        (Attempt::EnableFull, true) => {
            Transition::handled(flags).then(Effect::ArmTimer(TimerKind::Enable))
        }
        (Attempt::EnableFull, false) => Transition::handled(flags.with_layer2_turning_on(false))
            .to(PowerState::Off)
            .then(Effect::Notify(PublicState::Off)),

        (Attempt::DisableFull, true) => Transition::handled(flags),
        (Attempt::DisableFull, false) => {
            Transition::handled(flags.with_layer1_turning_off(false))
                .to(PowerState::Layer1On)
                .then(Effect::DisarmTimer(TimerKind::Disable))
                .then(Effect::Notify(PublicState::Layer1On))
        }

        // Services are stopping; wait for Layer1Stopped.
        (Attempt::StopLowPowerOnlyServices, true) => Transition::handled(flags),
        // Nothing was running, so the layer is already stopped.
        (Attempt::StopLowPowerOnlyServices, false) => layer1_stopped(flags),
    }
}

/// Entry action of `state`.
pub fn on_enter(state: PowerState) -> Vec<Effect> {
    match state {
        PowerState::Layer2On => vec![Effect::UpdateUuids],
        PowerState::Off | PowerState::Layer1On | PowerState::Pending => Vec::new(),
    }
}

/// Arm `kind`, cancelling it first in case a repeated completion already
/// armed it.
fn restart_timer(transition: Transition, kind: TimerKind) -> Transition {
    transition
        .then(Effect::DisarmTimer(kind))
        .then(Effect::ArmTimer(kind))
}

fn begin_cleanup(transition: Transition) -> Transition {
    restart_timer(
        transition.then(Effect::DisarmTimer(TimerKind::SetScanMode)),
        TimerKind::Cleanup,
    )
    .then(Effect::TeardownCleanup)
}

/// Hardware reported off while anything but a full-layer enable was in
/// flight. Whatever was in flight is superseded by a layer-1 stop.
fn hardware_disabled(flags: PendingFlags) -> Transition {
    let mut transition =
        Transition::handled(PendingFlags::CLEAR.with_layer1_turning_off(true))
            .then(Effect::DisarmTimer(TimerKind::Disable));
    if flags.layer1_turning_on() {
        transition = transition.then(Effect::DisarmTimer(TimerKind::StartLayer1));
    }
    if flags.layer2_turning_off() {
        for kind in [TimerKind::SetScanMode, TimerKind::Cleanup, TimerKind::StopLayer2] {
            transition = transition.then(Effect::DisarmTimer(kind));
        }
    }
    restart_timer(transition, TimerKind::StopLayer1).attempt(Attempt::StopLowPowerOnlyServices)
}

fn layer1_stopped(flags: PendingFlags) -> Transition {
    Transition::handled(flags.with_layer1_turning_off(false))
        .to(PowerState::Off)
        .then(Effect::DisarmTimer(TimerKind::StopLayer1))
        .then(Effect::Notify(PublicState::Off))
}

fn timed_out(flags: PendingFlags, kind: TimerKind) -> Transition {
    match (kind.recovery(), kind) {
        (Recovery::Recoverable, TimerKind::SetScanMode) => {
            begin_cleanup(Transition::handled(flags).then(Effect::ClearDisableGuard))
        }
        (Recovery::Recoverable, _) => Transition::handled(flags.with_layer1_turning_off(false))
            .to(PowerState::Off)
            .then(Effect::Notify(PublicState::Off)),
        (Recovery::Fatal, _) => {
            let mut transition = Transition::handled(PendingFlags::CLEAR)
                .to(PowerState::Off)
                .then(Effect::Notify(PublicState::Off));
            match kind {
                TimerKind::Enable => {
                    transition = transition.then(Effect::StopLowPowerOnlyServices);
                }
                TimerKind::Disable => {
                    if flags.layer2_turning_on() {
                        transition = transition.then(Effect::StopProfileServices);
                    }
                    transition = transition.then(Effect::StopLowPowerOnlyServices);
                }
                _ => {}
            }
            transition
                .then(Effect::DisableProfileServices)
                .then(Effect::FatalRecovery { cause: kind })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer1_on_pending() -> PendingFlags {
        PendingFlags::CLEAR.with_layer1_turning_on(true)
    }

    #[test]
    fn off_request_layer1_on_starts_bringup() {
        let t = transition(PowerState::Off, PendingFlags::CLEAR, Event::RequestLayer1On);

        assert_eq!(t.disposition, Disposition::Handled);
        assert_eq!(t.target, Some(PowerState::Pending));
        assert!(t.flags.layer1_turning_on());
        assert_eq!(
            t.effects,
            vec![
                Effect::Notify(PublicState::Layer1TurningOn),
                Effect::ArmTimer(TimerKind::StartLayer1),
                Effect::StartLayer1Bringup,
            ]
        );
        assert!(t.attempt.is_none());
    }

    #[test]
    fn off_request_all_off_is_ignored() {
        let t = transition(PowerState::Off, PendingFlags::CLEAR, Event::RequestAllOff);

        assert_eq!(t.disposition, Disposition::Ignored);
        assert_eq!(t.target, None);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn layer1_on_request_all_off_attempts_disable() {
        let t = transition(PowerState::Layer1On, PendingFlags::CLEAR, Event::RequestAllOff);

        assert_eq!(t.target, Some(PowerState::Pending));
        assert!(t.flags.layer1_turning_off());
        assert_eq!(t.attempt, Some(Attempt::DisableFull));
        assert!(t.effects.contains(&Effect::ArmTimer(TimerKind::Disable)));
    }

    #[test]
    fn failed_disable_reverts_to_layer1_on() {
        let flags = PendingFlags::CLEAR.with_layer1_turning_off(true);
        let t = settle(flags, Attempt::DisableFull, false);

        assert_eq!(t.target, Some(PowerState::Layer1On));
        assert!(t.flags.is_clear());
        assert_eq!(
            t.effects,
            vec![
                Effect::DisarmTimer(TimerKind::Disable),
                Effect::Notify(PublicState::Layer1On),
            ]
        );
    }

    #[test]
    fn layer2_requires_layer1() {
        let t = transition(PowerState::Off, PendingFlags::CLEAR, Event::RequestLayer2On);
        assert_eq!(t.disposition, Disposition::Unhandled);
        assert_eq!(t.target, None);
    }

    #[test]
    fn pending_defers_opposing_requests() {
        let turning_on = layer1_on_pending();
        assert_eq!(
            transition(PowerState::Pending, turning_on, Event::RequestAllOff).disposition,
            Disposition::Deferred
        );
        assert_eq!(
            transition(PowerState::Pending, turning_on, Event::RequestLayer2Off).disposition,
            Disposition::Deferred
        );
        assert_eq!(
            transition(PowerState::Pending, turning_on, Event::RequestLayer2On).disposition,
            Disposition::Ignored
        );

        let turning_off = PendingFlags::CLEAR.with_layer2_turning_off(true);
        assert_eq!(
            transition(PowerState::Pending, turning_off, Event::RequestLayer1On).disposition,
            Disposition::Deferred
        );
        assert_eq!(
            transition(PowerState::Pending, turning_off, Event::RequestAllOff).disposition,
            Disposition::Ignored
        );
    }

    #[test]
    fn completion_without_matching_flag_is_unhandled() {
        let t = transition(
            PowerState::Pending,
            layer1_on_pending(),
            Event::HardwareEnabled,
        );
        assert_eq!(t.disposition, Disposition::Unhandled);
        assert_eq!(t.target, None);
    }

    #[test]
    fn layer2_started_attempts_enable_then_rearms() {
        let flags = PendingFlags::CLEAR.with_layer2_turning_on(true);
        let t = transition(PowerState::Pending, flags, Event::HardwareLayer2Started);

        assert_eq!(t.effects, vec![Effect::DisarmTimer(TimerKind::Enable)]);
        assert_eq!(t.attempt, Some(Attempt::EnableFull));

        let ok = settle(flags, Attempt::EnableFull, true);
        assert_eq!(ok.target, None);
        assert_eq!(ok.effects, vec![Effect::ArmTimer(TimerKind::Enable)]);

        let failed = settle(flags, Attempt::EnableFull, false);
        assert_eq!(failed.target, Some(PowerState::Off));
        assert!(failed.flags.is_clear());
        assert_eq!(failed.effects, vec![Effect::Notify(PublicState::Off)]);
    }

    #[test]
    fn all_disabled_while_enabling_is_enable_failure() {
        let flags = PendingFlags::CLEAR.with_layer2_turning_on(true);
        let t = transition(PowerState::Pending, flags, Event::AllDisabled);

        assert_eq!(t.target, Some(PowerState::Off));
        assert!(t.flags.is_clear());
        assert!(t.effects.contains(&Effect::StopProfileServices));
        assert_eq!(t.effects.last(), Some(&Effect::Notify(PublicState::Off)));
    }

    #[test]
    fn all_disabled_while_turning_off_stops_low_power_services() {
        let flags = PendingFlags::CLEAR.with_layer1_turning_off(true);
        let t = transition(PowerState::Pending, flags, Event::AllDisabled);

        assert_eq!(t.target, None);
        assert_eq!(t.attempt, Some(Attempt::StopLowPowerOnlyServices));

        let nothing_running = settle(flags, Attempt::StopLowPowerOnlyServices, false);
        assert_eq!(nothing_running, layer1_stopped(flags));
        assert_eq!(nothing_running.target, Some(PowerState::Off));
    }

    #[test]
    fn all_disabled_during_bringup_becomes_a_layer1_stop() {
        let t = transition(PowerState::Pending, layer1_on_pending(), Event::AllDisabled);

        assert_eq!(t.disposition, Disposition::Handled);
        assert_eq!(t.flags, PendingFlags::CLEAR.with_layer1_turning_off(true));
        assert!(t.effects.contains(&Effect::DisarmTimer(TimerKind::StartLayer1)));
        assert_eq!(t.effects.last(), Some(&Effect::ArmTimer(TimerKind::StopLayer1)));
        assert_eq!(t.attempt, Some(Attempt::StopLowPowerOnlyServices));

        let nothing_running = settle(t.flags, Attempt::StopLowPowerOnlyServices, false);
        assert_eq!(nothing_running.target, Some(PowerState::Off));
        assert!(nothing_running.flags.is_clear());
    }

    #[test]
    fn all_disabled_during_teardown_cancels_teardown_timers() {
        let flags = PendingFlags::CLEAR.with_layer2_turning_off(true);
        let t = transition(PowerState::Pending, flags, Event::AllDisabled);

        assert_eq!(t.flags, PendingFlags::CLEAR.with_layer1_turning_off(true));
        for kind in [TimerKind::SetScanMode, TimerKind::Cleanup, TimerKind::StopLayer2] {
            assert!(t.effects.contains(&Effect::DisarmTimer(kind)), "{kind}");
        }
        assert_eq!(t.attempt, Some(Attempt::StopLowPowerOnlyServices));

        let late = transition(PowerState::Pending, t.flags, Event::Layer2Stopped);
        assert_eq!(late.disposition, Disposition::Unhandled);
    }

    #[test]
    fn set_scan_mode_timeout_continues_teardown() {
        let flags = PendingFlags::CLEAR.with_layer2_turning_off(true);
        let t = transition(
            PowerState::Pending,
            flags,
            Event::Timeout(TimerKind::SetScanMode),
        );

        assert_eq!(t.target, None);
        assert_eq!(t.flags, flags);
        assert_eq!(
            t.effects,
            vec![
                Effect::ClearDisableGuard,
                Effect::DisarmTimer(TimerKind::SetScanMode),
                Effect::DisarmTimer(TimerKind::Cleanup),
                Effect::ArmTimer(TimerKind::Cleanup),
                Effect::TeardownCleanup,
            ]
        );
    }

    #[test]
    fn repeated_completions_restart_their_timer() {
        let flags = PendingFlags::CLEAR.with_layer2_turning_off(true);
        let t = transition(PowerState::Pending, flags, Event::BeginDisable);

        let disarm = t
            .effects
            .iter()
            .position(|e| *e == Effect::DisarmTimer(TimerKind::StopLayer2));
        let arm = t
            .effects
            .iter()
            .position(|e| *e == Effect::ArmTimer(TimerKind::StopLayer2));
        assert!(disarm.is_some());
        assert!(disarm < arm);
    }

    #[test]
    fn stop_layer1_timeout_is_recoverable() {
        let flags = PendingFlags::CLEAR.with_layer1_turning_off(true);
        let t = transition(
            PowerState::Pending,
            flags,
            Event::Timeout(TimerKind::StopLayer1),
        );

        assert_eq!(t.target, Some(PowerState::Off));
        assert!(t.flags.is_clear());
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::FatalRecovery { .. })));
    }

    #[test]
    fn fatal_timeouts_end_in_restart() {
        for kind in [
            TimerKind::StartLayer1,
            TimerKind::Enable,
            TimerKind::Disable,
            TimerKind::StopLayer2,
            TimerKind::Cleanup,
        ] {
            let t = transition(
                PowerState::Pending,
                PendingFlags::CLEAR.with_layer2_turning_on(true),
                Event::Timeout(kind),
            );

            assert_eq!(t.target, Some(PowerState::Off), "{kind}");
            assert!(t.flags.is_clear(), "{kind}");
            assert_eq!(t.effects[0], Effect::Notify(PublicState::Off), "{kind}");
            assert!(t.effects.contains(&Effect::DisableProfileServices), "{kind}");
            assert_eq!(
                t.effects.last(),
                Some(&Effect::FatalRecovery { cause: kind }),
                "{kind}"
            );
        }
    }

    #[test]
    fn timeouts_outside_pending_are_unhandled() {
        let t = transition(
            PowerState::Layer1On,
            PendingFlags::CLEAR,
            Event::Timeout(TimerKind::Enable),
        );
        assert_eq!(t.disposition, Disposition::Unhandled);
    }

    #[test]
    fn only_layer2_on_has_entry_effects() {
        assert_eq!(on_enter(PowerState::Layer2On), vec![Effect::UpdateUuids]);
        assert!(on_enter(PowerState::Off).is_empty());
        assert!(on_enter(PowerState::Layer1On).is_empty());
        assert!(on_enter(PowerState::Pending).is_empty());
    }
}
