//! State transition history tracking.
//!
//! Provides immutable, bounded tracking of state changes over time.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state change.
///
/// # Example
///
/// ```rust
/// use power_sequencer::core::{PowerState, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: PowerState::Off,
///     to: PowerState::Pending,
///     trigger: "RequestLayer1On".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.trigger, "RequestLayer1On");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being left
    pub from: S,
    /// The state being entered
    pub to: S,
    /// Name of the event whose handling caused the change
    pub trigger: String,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state changes.
///
/// History is immutable - [`record`](Self::record) returns a new history with
/// the transition added. When a limit is set, the oldest entries are dropped
/// once it is exceeded.
///
/// # Example
///
/// ```rust
/// use power_sequencer::core::{PowerState, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: PowerState::Off,
///         to: PowerState::Pending,
///         trigger: "RequestLayer1On".to_string(),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: PowerState::Pending,
///         to: PowerState::Layer1On,
///         trigger: "HardwareLayer1Started".to_string(),
///         timestamp: Utc::now(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&PowerState::Off, &PowerState::Pending, &PowerState::Layer1On]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
    limit: Option<usize>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new, unbounded, empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            limit: None,
        }
    }

    /// Create an empty history keeping at most `limit` transitions.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// This does not mutate the existing history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        if let Some(limit) = self.limit {
            let excess = transitions.len().saturating_sub(limit);
            transitions.drain(..excess);
        }
        Self {
            transitions,
            limit: self.limit,
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition, then the
    /// `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the oldest and newest retained transitions.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
