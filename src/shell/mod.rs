//! The imperative shell: everything that talks to the outside world.
//!
//! The machine in [`crate::effects`] only describes what should happen. This
//! module delivers events to it, carries out the effects it returns against
//! the collaborator ports, and schedules its timers.

pub mod dispatcher;
pub mod notify;
pub mod ports;
pub mod runtime;
pub mod timers;

pub use dispatcher::{Delivery, Dispatcher};
pub use notify::notify_state_change;
pub use ports::{Collaborators, PropertiesPort, ServicePort, VendorPort};
pub use runtime::SequencerHandle;
pub use timers::{ArmedTimer, ManualTimers, TimerDriver};
