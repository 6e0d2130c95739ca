//! Builder API for sequencer configuration.

use crate::config::{ConfigError, SequencerConfig};
use crate::core::TimerKind;
use std::time::Duration;

/// Fluent builder for [`SequencerConfig`].
///
/// ```rust
/// use power_sequencer::config::ConfigBuilder;
/// use power_sequencer::core::TimerKind;
/// use std::time::Duration;
///
/// let config = ConfigBuilder::new()
///     .timeout(TimerKind::Enable, Duration::from_secs(20))
///     .history_limit(16)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeouts.delay(TimerKind::Enable), Duration::from_secs(20));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: SequencerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay for one kind of timer
    pub fn timeout(mut self, kind: TimerKind, delay: Duration) -> Self {
        self.config.timeouts.set_delay(kind, delay);
        self
    }

    /// Set how many transitions the history keeps
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Build and validate, reporting every violation.
    pub fn build(self) -> Result<SequencerConfig, ConfigError> {
        self.config.validated()
    }

    /// Build without validating.
    pub fn build_unchecked(self) -> SequencerConfig {
        self.config
    }
}
