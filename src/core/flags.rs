//! In-flight operation tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which asynchronous operations are currently in flight.
///
/// A plain `Copy` value: the transition function reads one snapshot and
/// returns the replacement alongside the new state, so flags never change
/// independently of a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingFlags {
    layer1_turning_on: bool,
    layer1_turning_off: bool,
    layer2_turning_on: bool,
    layer2_turning_off: bool,
}

impl PendingFlags {
    /// No operation in flight.
    pub const CLEAR: Self = Self {
        layer1_turning_on: false,
        layer1_turning_off: false,
        layer2_turning_on: false,
        layer2_turning_off: false,
    };

    pub fn layer1_turning_on(&self) -> bool {
        self.layer1_turning_on
    }

    pub fn layer1_turning_off(&self) -> bool {
        self.layer1_turning_off
    }

    pub fn layer2_turning_on(&self) -> bool {
        self.layer2_turning_on
    }

    pub fn layer2_turning_off(&self) -> bool {
        self.layer2_turning_off
    }

    pub fn with_layer1_turning_on(self, value: bool) -> Self {
        Self {
            layer1_turning_on: value,
            ..self
        }
    }

    pub fn with_layer1_turning_off(self, value: bool) -> Self {
        Self {
            layer1_turning_off: value,
            ..self
        }
    }

    pub fn with_layer2_turning_on(self, value: bool) -> Self {
        Self {
            layer2_turning_on: value,
            ..self
        }
    }

    pub fn with_layer2_turning_off(self, value: bool) -> Self {
        Self {
            layer2_turning_off: value,
            ..self
        }
    }

    /// Either layer is being brought up.
    pub fn any_turning_on(&self) -> bool {
        self.layer1_turning_on || self.layer2_turning_on
    }

    /// Either layer is being torn down.
    pub fn any_turning_off(&self) -> bool {
        self.layer1_turning_off || self.layer2_turning_off
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::CLEAR
    }

    /// On and off are mutually exclusive for each layer.
    pub fn is_consistent(&self) -> bool {
        !(self.layer1_turning_on && self.layer1_turning_off)
            && !(self.layer2_turning_on && self.layer2_turning_off)
    }

    /// Names of the set flags, for logging.
    pub fn describe(&self) -> Vec<&'static str> {
        [
            (self.layer1_turning_on, "layer1TurningOn"),
            (self.layer1_turning_off, "layer1TurningOff"),
            (self.layer2_turning_on, "layer2TurningOn"),
            (self.layer2_turning_off, "layer2TurningOff"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

impl fmt::Display for PendingFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.describe();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(" "))
        }
    }
}
