//! Errors from writing or reading a [`Snapshot`](super::Snapshot).

use std::fmt;
use thiserror::Error;

/// Encoding a snapshot is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Binary,
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Binary => "binary",
        })
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not write {format} snapshot: {reason}")]
    Encode {
        format: SnapshotFormat,
        reason: String,
    },

    /// The bytes are not a snapshot at all, or are truncated.
    #[error("could not read {format} snapshot: {reason}")]
    Decode {
        format: SnapshotFormat,
        reason: String,
    },

    /// Written by a sequencer with a different snapshot layout.
    #[error("snapshot version {found} cannot be read, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Decoded cleanly, but no sequence of transitions reaches the machine it
    /// describes (flags set outside Pending, timers with nothing in flight).
    #[error("snapshot describes an unreachable machine: {}", .problems.join("; "))]
    Unreachable { problems: Vec<String> },
}
