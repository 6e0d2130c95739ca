//! Diagnostic snapshots of a running sequencer.
//!
//! A [`Snapshot`] is a point-in-time dump of everything the sequencer knows:
//! state, in-flight flags, armed timers, queued deferrals and recent history.
//! It can be written as JSON for humans or as bincode for compact storage,
//! and is checked for consistency when read back.

use crate::core::{PendingFlags, PowerState, StateHistory, TimerKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

pub mod error;

pub use error::{SnapshotError, SnapshotFormat};

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    pub state: PowerState,

    pub flags: PendingFlags,

    /// Timers armed at capture time, in kind order
    pub armed_timers: Vec<TimerKind>,

    /// Requests waiting for the in-flight operation to finish
    pub deferred: usize,

    /// Fatal recovery has run
    pub halted: bool,

    pub history: StateHistory<PowerState>,
}

impl Snapshot {
    pub fn capture(
        state: PowerState,
        flags: PendingFlags,
        armed_timers: Vec<TimerKind>,
        deferred: usize,
        halted: bool,
        history: StateHistory<PowerState>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state,
            flags,
            armed_timers,
            deferred,
            halted,
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Encode {
            format: SnapshotFormat::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json).map_err(|e| SnapshotError::Decode {
            format: SnapshotFormat::Json,
            reason: e.to_string(),
        })?;
        snapshot.checked()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode {
            format: SnapshotFormat::Binary,
            reason: e.to_string(),
        })
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode {
            format: SnapshotFormat::Binary,
            reason: e.to_string(),
        })?;
        snapshot.checked()
    }

    fn checked(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(SnapshotError::Unreachable {
                problems: errors.iter().cloned().collect(),
            }),
        }
    }

    /// Check the snapshot describes a reachable machine, reporting every
    /// problem found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<String>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<String>>> = Vec::new();
        let pending = self.state == PowerState::Pending;

        checks.push(if self.flags.is_consistent() {
            Validation::success(())
        } else {
            Validation::fail(format!(
                "a layer is both turning on and off: {}",
                self.flags
            ))
        });

        checks.push(if pending || self.flags.is_clear() {
            Validation::success(())
        } else {
            Validation::fail(format!(
                "flags {} set while settled in {}",
                self.flags, self.state
            ))
        });

        checks.push(if pending || self.armed_timers.is_empty() {
            Validation::success(())
        } else {
            Validation::fail(format!(
                "{} timer(s) armed while settled in {}",
                self.armed_timers.len(),
                self.state
            ))
        });

        let mut seen = Vec::with_capacity(self.armed_timers.len());
        for kind in &self.armed_timers {
            checks.push(if seen.contains(kind) {
                Validation::fail(format!("timer {kind} listed twice"))
            } else {
                seen.push(*kind);
                Validation::success(())
            });
        }

        if let Some(last) = self.history.transitions().last() {
            checks.push(if last.to == self.state {
                Validation::success(())
            } else {
                Validation::fail(format!(
                    "history ends in {} but state is {}",
                    last.to, self.state
                ))
            });
        }

        Validation::all_vec(checks).map(|_| ())
    }
}
