//! Transitions as data, and the machine that applies them.
//!
//! This is the "pure core" of the sequencer:
//! - [`transition`] and [`settle`] compute `(state, flags, event) -> (state, flags, effects)`
//! - [`PowerMachine`] applies their output and tracks timers and history
//!
//! Executing the effects is the job of [`crate::shell`].

mod effect;
mod machine;
mod transition;

pub use effect::{Attempt, Effect};
pub use machine::{Outcome, PowerMachine};
pub use transition::{on_enter, settle, should_defer, transition, Disposition, Transition};
