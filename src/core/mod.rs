//! Core sequencer types.
//!
//! This module contains the pure data of the state machine:
//! - Internal and public power states
//! - In-flight operation flags
//! - Events and hardware status translation
//! - Timeout kinds with their recovery policy
//! - Immutable history tracking
//!
//! Nothing in here performs I/O.

mod event;
mod flags;
mod history;
pub(crate) mod macros;
mod state;
mod timer;

pub use event::{Event, HardwareStatus, UnknownStatus, STATUS_OFF, STATUS_ON};
pub use flags::PendingFlags;
pub use history::{StateHistory, StateTransition};
pub use state::{PowerState, PublicState, State};
pub use timer::{Recovery, TimerError, TimerKind, TimerSet};
