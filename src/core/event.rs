//! Events delivered to the sequencer.

use crate::core::timer::TimerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Everything the sequencer reacts to: user intent, collaborator and
/// hardware completions, and timer firings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Bring up the low-power layer.
    RequestLayer1On,
    /// Bring up the full layer on top of the low-power layer.
    RequestLayer2On,
    /// Tear the full layer down, leaving the low-power layer up.
    RequestLayer2Off,
    /// Tear the low-power layer down.
    RequestAllOff,

    /// Low-power services finished starting.
    HardwareLayer1Started,
    /// Profile services for the full layer finished starting.
    HardwareLayer2Started,
    /// The hardware reported itself enabled and ready.
    HardwareEnabled,
    /// The hardware reported itself disabled.
    AllDisabled,
    /// Scan mode was cleared; vendor cleanup can begin.
    BeginTeardownCleanup,
    /// Vendor cleanup finished; profile services can stop.
    BeginDisable,
    /// Low-power-only services finished stopping.
    Layer1Stopped,
    /// Profile services finished stopping.
    Layer2Stopped,

    /// A step's timer fired before the step completed.
    Timeout(TimerKind),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestLayer1On => "RequestLayer1On",
            Self::RequestLayer2On => "RequestLayer2On",
            Self::RequestLayer2Off => "RequestLayer2Off",
            Self::RequestAllOff => "RequestAllOff",
            Self::HardwareLayer1Started => "HardwareLayer1Started",
            Self::HardwareLayer2Started => "HardwareLayer2Started",
            Self::HardwareEnabled => "HardwareEnabled",
            Self::AllDisabled => "AllDisabled",
            Self::BeginTeardownCleanup => "BeginTeardownCleanup",
            Self::BeginDisable => "BeginDisable",
            Self::Layer1Stopped => "Layer1Stopped",
            Self::Layer2Stopped => "Layer2Stopped",
            Self::Timeout(kind) => match kind {
                TimerKind::StartLayer1 => "Timeout(StartLayer1)",
                TimerKind::Enable => "Timeout(Enable)",
                TimerKind::Disable => "Timeout(Disable)",
                TimerKind::StopLayer1 => "Timeout(StopLayer1)",
                TimerKind::StopLayer2 => "Timeout(StopLayer2)",
                TimerKind::SetScanMode => "Timeout(SetScanMode)",
                TimerKind::Cleanup => "Timeout(Cleanup)",
            },
        }
    }

    /// User intent, as opposed to a completion or a firing.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::RequestLayer1On
                | Self::RequestLayer2On
                | Self::RequestLayer2Off
                | Self::RequestAllOff
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw status code reported by the hardware state callback for "off".
pub const STATUS_OFF: u8 = 0x00;
/// Raw status code reported by the hardware state callback for "on".
pub const STATUS_ON: u8 = 0x01;

/// Hardware power status as reported by the state callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareStatus {
    Off,
    On,
}

impl HardwareStatus {
    /// The event this status translates to.
    pub fn into_event(self) -> Event {
        match self {
            Self::Off => Event::AllDisabled,
            Self::On => Event::HardwareEnabled,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unknown hardware status {0:#04x}")]
pub struct UnknownStatus(pub u8);

impl TryFrom<u8> for HardwareStatus {
    type Error = UnknownStatus;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            STATUS_OFF => Ok(Self::Off),
            STATUS_ON => Ok(Self::On),
            other => Err(UnknownStatus(other)),
        }
    }
}
