//! Power Sequencer: the power-state sequencer for a dual-layer radio adapter.
//!
//! The adapter has a low-power layer (layer 1) that must be up before the
//! full layer (layer 2) can be enabled, and torn down last. Requests to turn
//! layers on or off arrive asynchronously, hardware reports completion
//! through callbacks, and every step is guarded by a timeout.
//!
//! The crate follows a "pure core, imperative shell" split:
//!
//! - [`core`] holds the data: states, flags, events, timer kinds, history
//! - [`effects`] holds the transition table as pure functions, and a
//!   [`PowerMachine`](effects::PowerMachine) that applies it
//! - [`shell`] delivers events one at a time, runs the effects against
//!   collaborator ports, and schedules timers
//!
//! # Example
//!
//! ```rust
//! use power_sequencer::core::{Event, PowerState};
//! use power_sequencer::effects::{Effect, PowerMachine};
//!
//! let mut machine = PowerMachine::new();
//! let outcome = machine.handle(Event::RequestLayer1On);
//! assert_eq!(outcome.to, PowerState::Pending);
//! assert!(outcome.effects.contains(&Effect::StartLayer1Bringup));
//!
//! let outcome = machine.handle(Event::HardwareLayer1Started);
//! assert_eq!(outcome.to, PowerState::Layer1On);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod error;
pub mod shell;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{BuildError, SequencerBuilder};
pub use config::{ConfigBuilder, SequencerConfig};
pub use crate::core::{Event, PendingFlags, PowerState, PublicState, State, TimerKind};
pub use error::{Error, Result};
pub use shell::{
    Delivery, Dispatcher, ManualTimers, PropertiesPort, SequencerHandle, ServicePort, VendorPort,
};
pub use snapshot::Snapshot;
