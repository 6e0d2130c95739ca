//! Timeout kinds, their recovery policy, and armed-timer bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One timeout per asynchronous step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Low-power layer bring-up.
    StartLayer1,
    /// Full-layer enable (profile start and hardware enable).
    Enable,
    /// Hardware disable during low-power teardown.
    Disable,
    /// Final stop of the low-power-only services.
    StopLayer1,
    /// Profile services stop during full-layer teardown.
    StopLayer2,
    /// Scan-mode acknowledgement before full-layer teardown.
    SetScanMode,
    /// Vendor cleanup during full-layer teardown.
    Cleanup,
}

impl TimerKind {
    pub const ALL: [TimerKind; 7] = [
        TimerKind::StartLayer1,
        TimerKind::Enable,
        TimerKind::Disable,
        TimerKind::StopLayer1,
        TimerKind::StopLayer2,
        TimerKind::SetScanMode,
        TimerKind::Cleanup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartLayer1 => "StartLayer1",
            Self::Enable => "Enable",
            Self::Disable => "Disable",
            Self::StopLayer1 => "StopLayer1",
            Self::StopLayer2 => "StopLayer2",
            Self::SetScanMode => "SetScanMode",
            Self::Cleanup => "Cleanup",
        }
    }

    /// What a firing of this kind means for the process.
    ///
    /// Fatal kinds leave the hardware power state unverifiable, so the only
    /// way back to a known state is a process restart.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::SetScanMode | Self::StopLayer1 => Recovery::Recoverable,
            Self::StartLayer1 | Self::Enable | Self::Disable | Self::StopLayer2 | Self::Cleanup => {
                Recovery::Fatal
            }
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recovery policy for a timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recovery {
    /// Fall back to a safe state and keep running.
    Recoverable,
    /// Fall back to `Off` and restart the process.
    Fatal,
}

/// Errors from [`TimerSet`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer {0} is already armed")]
    AlreadyArmed(TimerKind),
}

/// Armed timers, keyed by kind, each stamped with the generation it was
/// armed under.
///
/// A firing carries the generation it was armed with; once the kind is
/// disarmed or re-armed, that generation is no longer current and the
/// firing is stale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerSet {
    armed: BTreeMap<TimerKind, u64>,
    next_generation: u64,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind`, returning its generation.
    pub fn arm(&mut self, kind: TimerKind) -> Result<u64, TimerError> {
        if self.armed.contains_key(&kind) {
            return Err(TimerError::AlreadyArmed(kind));
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.armed.insert(kind, generation);
        Ok(generation)
    }

    /// Disarm `kind`. Returns whether it was armed; disarming twice is a no-op.
    pub fn disarm(&mut self, kind: TimerKind) -> bool {
        self.armed.remove(&kind).is_some()
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }

    pub fn generation(&self, kind: TimerKind) -> Option<u64> {
        self.armed.get(&kind).copied()
    }

    /// Whether a firing stamped with `generation` is still the live one.
    pub fn is_current(&self, kind: TimerKind, generation: u64) -> bool {
        self.generation(kind) == Some(generation)
    }

    pub fn armed(&self) -> impl Iterator<Item = TimerKind> + '_ {
        self.armed.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }
}
