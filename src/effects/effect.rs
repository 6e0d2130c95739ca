//! Side effects requested by transitions.

use crate::core::{PublicState, TimerKind};

/// A side effect, described as data.
///
/// Transitions return these instead of performing them; the dispatcher
/// executes them in order against the collaborators and the timer driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Announce a new public state.
    Notify(PublicState),
    ArmTimer(TimerKind),
    DisarmTimer(TimerKind),

    StartLayer1Bringup,
    StartProfileServices,
    StopProfileServices,
    /// Force-stop whatever profile services were started.
    DisableProfileServices,
    /// Stop low-power-only services, ignoring whether any were running.
    StopLowPowerOnlyServices,
    UpdateUuids,

    ClearDisableGuard,
    ReadyForUse,
    FullDisableRequested,
    LowPowerDisableRequested,

    TeardownCleanup,

    /// Hardware state is unverifiable; the process must restart.
    FatalRecovery { cause: TimerKind },
}

/// A synchronous collaborator call whose result steers the machine.
///
/// A transition carries at most one, performed after its effects. The
/// result is fed back through [`settle`](crate::effects::settle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Enable the full hardware stack.
    EnableFull,
    /// Disable the hardware.
    DisableFull,
    /// Stop low-power-only services; fails when none were running.
    StopLowPowerOnlyServices,
}

impl Attempt {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnableFull => "EnableFull",
            Self::DisableFull => "DisableFull",
            Self::StopLowPowerOnlyServices => "StopLowPowerOnlyServices",
        }
    }
}
