//! Crate-level error type.

use crate::builder::BuildError;
use crate::config::ConfigError;
use crate::core::UnknownStatus;
use crate::snapshot::SnapshotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    UnknownHardwareStatus(#[from] UnknownStatus),

    /// The sequencer task is gone: it halted after fatal recovery, or its
    /// runtime shut down.
    #[error("sequencer has stopped")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;
