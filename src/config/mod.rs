//! Sequencer configuration.
//!
//! Timeout delays are policy, not correctness: any positive value works, the
//! defaults mirror what the hardware usually needs. Configurations can be
//! built fluently with [`ConfigBuilder`] or read from JSON, where every field
//! is optional.
//!
//! # Example
//!
//! ```rust
//! use power_sequencer::config::SequencerConfig;
//! use power_sequencer::core::TimerKind;
//! use std::time::Duration;
//!
//! let config = SequencerConfig::from_json(r#"{ "timeouts": { "enable_ms": 15000 } }"#).unwrap();
//! assert_eq!(config.timeouts.delay(TimerKind::Enable), Duration::from_secs(15));
//! assert_eq!(config.timeouts.delay(TimerKind::Disable), Duration::from_secs(8));
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::ConfigBuilder;
pub use violations::{ConfigError, ConfigViolation};

use crate::core::TimerKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;

pub const DEFAULT_START_LAYER1_MS: u64 = 2_000;
pub const DEFAULT_ENABLE_MS: u64 = 12_000;
pub const DEFAULT_DISABLE_MS: u64 = 8_000;
pub const DEFAULT_STOP_LAYER1_MS: u64 = 2_000;
pub const DEFAULT_STOP_LAYER2_MS: u64 = 4_000;
/// Shared by the scan-mode and cleanup steps.
pub const DEFAULT_PROPERTY_OP_MS: u64 = 2_000;
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Delay before each kind of timer fires, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub start_layer1_ms: u64,
    pub enable_ms: u64,
    pub disable_ms: u64,
    pub stop_layer1_ms: u64,
    pub stop_layer2_ms: u64,
    pub set_scan_mode_ms: u64,
    pub cleanup_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_layer1_ms: DEFAULT_START_LAYER1_MS,
            enable_ms: DEFAULT_ENABLE_MS,
            disable_ms: DEFAULT_DISABLE_MS,
            stop_layer1_ms: DEFAULT_STOP_LAYER1_MS,
            stop_layer2_ms: DEFAULT_STOP_LAYER2_MS,
            set_scan_mode_ms: DEFAULT_PROPERTY_OP_MS,
            cleanup_ms: DEFAULT_PROPERTY_OP_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn delay(&self, kind: TimerKind) -> Duration {
        Duration::from_millis(*self.slot(kind))
    }

    pub fn set_delay(&mut self, kind: TimerKind, delay: Duration) {
        *self.slot_mut(kind) = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    }

    fn slot(&self, kind: TimerKind) -> &u64 {
        match kind {
            TimerKind::StartLayer1 => &self.start_layer1_ms,
            TimerKind::Enable => &self.enable_ms,
            TimerKind::Disable => &self.disable_ms,
            TimerKind::StopLayer1 => &self.stop_layer1_ms,
            TimerKind::StopLayer2 => &self.stop_layer2_ms,
            TimerKind::SetScanMode => &self.set_scan_mode_ms,
            TimerKind::Cleanup => &self.cleanup_ms,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut u64 {
        match kind {
            TimerKind::StartLayer1 => &mut self.start_layer1_ms,
            TimerKind::Enable => &mut self.enable_ms,
            TimerKind::Disable => &mut self.disable_ms,
            TimerKind::StopLayer1 => &mut self.stop_layer1_ms,
            TimerKind::StopLayer2 => &mut self.stop_layer2_ms,
            TimerKind::SetScanMode => &mut self.set_scan_mode_ms,
            TimerKind::Cleanup => &mut self.cleanup_ms,
        }
    }
}

/// Everything the sequencer can be tuned with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub timeouts: TimeoutConfig,
    /// Transitions kept in the diagnostic history.
    pub history_limit: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl SequencerConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document).map_err(|err| {
            ConfigError(vec![ConfigViolation::Malformed {
                message: err.to_string(),
            }])
        })?;
        config.validated()
    }

    /// Return `self` if every rule holds, otherwise every violation.
    pub fn validated(self) -> Result<Self, ConfigError> {
        match rules::validate(&self) {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(ConfigError(errors.iter().cloned().collect())),
        }
    }
}
