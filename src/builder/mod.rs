//! Builder API for wiring a sequencer to its collaborators.

pub mod error;
pub mod sequencer;

pub use error::BuildError;
pub use sequencer::SequencerBuilder;
