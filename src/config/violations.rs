//! Configuration violations.

use crate::core::TimerKind;
use thiserror::Error;

/// A single problem found while validating a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("timeout for {kind} must be greater than zero")]
    ZeroDelay { kind: TimerKind },

    #[error("history limit must be greater than zero")]
    ZeroHistoryLimit,

    #[error("invalid configuration document: {message}")]
    Malformed { message: String },
}

/// A configuration rejected by validation, with every violation found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid configuration ({} violation(s)): {}", .0.len(), describe(.0))]
pub struct ConfigError(pub Vec<ConfigViolation>);

impl ConfigError {
    pub fn violations(&self) -> &[ConfigViolation] {
        &self.0
    }
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
