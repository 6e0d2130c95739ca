//! Power states, internal and public.
//!
//! [`PowerState`] is what the machine occupies; [`PublicState`] is what gets
//! announced to the rest of the system. The public view is a superset: the
//! `*Turning*` values are announced while the machine sits in
//! [`PowerState::Pending`] and have no internal counterpart.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Trait for state enums.
///
/// All methods are pure. Use [`state_enum!`](crate::state_enum) to derive it.
pub trait State:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this state only exists while an operation is in flight.
    ///
    /// Default implementation returns `false`.
    fn is_transient(&self) -> bool {
        false
    }
}

crate::state_enum! {
    /// The state the sequencer occupies. Exactly one is active at a time.
    pub enum PowerState {
        /// Both layers are down. Initial state.
        Off,
        /// The low-power layer is up, the full layer is down.
        Layer1On,
        /// Both layers are up.
        Layer2On,
        /// An asynchronous bring-up or tear-down step is in flight.
        Pending,
    }
    transient: [Pending]
}

impl Default for PowerState {
    fn default() -> Self {
        Self::Off
    }
}

impl PowerState {
    /// The public state announced when the machine settles in `self`.
    ///
    /// Returns `None` for [`PowerState::Pending`], whose public value depends on
    /// which operation is in flight.
    pub fn settled_public_state(self) -> Option<PublicState> {
        match self {
            Self::Off => Some(PublicState::Off),
            Self::Layer1On => Some(PublicState::Layer1On),
            Self::Layer2On => Some(PublicState::Layer2On),
            Self::Pending => None,
        }
    }
}

crate::state_enum! {
    /// The externally visible adapter state.
    pub enum PublicState {
        Off,
        Layer1TurningOn,
        Layer1On,
        Layer2TurningOn,
        Layer2On,
        Layer2TurningOff,
        Layer1TurningOff,
    }
    transient: [Layer1TurningOn, Layer2TurningOn, Layer2TurningOff, Layer1TurningOff]
}

impl Default for PublicState {
    fn default() -> Self {
        Self::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_names() {
        assert_eq!(PowerState::Off.name(), "Off");
        assert_eq!(PowerState::Layer1On.name(), "Layer1On");
        assert_eq!(PowerState::Layer2On.name(), "Layer2On");
        assert_eq!(PowerState::Pending.name(), "Pending");
    }

    #[test]
    fn only_pending_is_transient() {
        assert!(PowerState::Pending.is_transient());
        assert!(!PowerState::Off.is_transient());
        assert!(!PowerState::Layer1On.is_transient());
        assert!(!PowerState::Layer2On.is_transient());
    }

    #[test]
    fn turning_public_states_are_transient() {
        assert!(PublicState::Layer1TurningOn.is_transient());
        assert!(PublicState::Layer2TurningOff.is_transient());
        assert!(!PublicState::Layer2On.is_transient());
        assert!(!PublicState::Off.is_transient());
    }

    #[test]
    fn settled_states_map_to_public_states() {
        assert_eq!(PowerState::Off.settled_public_state(), Some(PublicState::Off));
        assert_eq!(
            PowerState::Layer1On.settled_public_state(),
            Some(PublicState::Layer1On)
        );
        assert_eq!(
            PowerState::Layer2On.settled_public_state(),
            Some(PublicState::Layer2On)
        );
        assert_eq!(PowerState::Pending.settled_public_state(), None);
    }

    #[test]
    fn initial_state_is_off() {
        assert_eq!(PowerState::default(), PowerState::Off);
        assert_eq!(PublicState::default(), PublicState::Off);
    }

    #[test]
    fn state_serializes_correctly() {
        let json = serde_json::to_string(&PowerState::Layer1On).unwrap();
        let back: PowerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PowerState::Layer1On);
    }
}
