//! Port traits: the boundary between the sequencer and the subsystems it
//! drives.
//!
//! ```text
//!   Dispatcher ──▶ Port trait ──▶ service / properties / vendor
//! ```
//!
//! The sequencer only ever holds `Weak` references to its collaborators.
//! A collaborator that can no longer be upgraded means shutdown is in
//! progress, and events are dropped instead of processed.

use crate::core::PublicState;
use std::sync::{Arc, Weak};

/// The service owning the hardware and profile lifecycle.
pub trait ServicePort: Send + Sync {
    /// Begin bringing up the low-power layer; completion arrives as
    /// `HardwareLayer1Started`.
    fn start_layer1_bringup(&self);

    /// Begin starting the full layer's profile services; completion arrives
    /// as `HardwareLayer2Started`.
    fn start_profile_services(&self);

    /// Enable the full hardware stack. `false` means the request was refused
    /// outright.
    fn enable_full(&self, restricted_user: bool) -> bool;

    /// Disable the hardware. `false` means the request was refused outright.
    fn disable_full(&self) -> bool;

    fn stop_profile_services(&self);

    /// Force-stop whatever profile services were started.
    fn disable_profile_services(&self);

    /// Stop services that only run with the low-power layer. Returns whether
    /// anything was actually running.
    fn stop_low_power_only_services(&self) -> bool;

    fn update_uuids(&self);

    /// Fan a public state change out to listeners.
    fn on_public_state_changed(&self, old: PublicState, new: PublicState);

    /// Hardware state is unverifiable; tear the process down so a supervisor
    /// restarts it.
    fn request_process_restart(&self);

    /// Whether the current user is restricted (guest); passed to
    /// [`enable_full`](Self::enable_full).
    fn is_restricted_user(&self) -> bool {
        false
    }
}

/// Persisted adapter properties.
pub trait PropertiesPort: Send + Sync {
    fn public_state(&self) -> PublicState;

    fn set_public_state(&self, state: PublicState);

    /// The full layer is up and usable.
    fn on_ready_for_use(&self);

    /// Full-layer teardown started; clears scan mode and eventually sends
    /// `BeginTeardownCleanup`.
    fn on_full_disable_requested(&self);

    /// Low-power teardown is about to disable the hardware.
    fn on_low_power_disable_requested(&self);

    fn clear_disable_guard(&self);
}

/// Vendor-specific hooks.
pub trait VendorPort: Send + Sync {
    /// Run vendor cleanup; completion arrives as `BeginDisable`.
    fn run_teardown_cleanup(&self);
}

/// Weak handles to the three collaborators. All three are required; losing
/// any one of them stops event processing.
#[derive(Clone, Default)]
pub struct Collaborators {
    service: Option<Weak<dyn ServicePort>>,
    properties: Option<Weak<dyn PropertiesPort>>,
    vendor: Option<Weak<dyn VendorPort>>,
}

impl Collaborators {
    pub fn new(
        service: Weak<dyn ServicePort>,
        properties: Weak<dyn PropertiesPort>,
        vendor: Weak<dyn VendorPort>,
    ) -> Self {
        Self {
            service: Some(service),
            properties: Some(properties),
            vendor: Some(vendor),
        }
    }

    pub fn service(&self) -> Option<Arc<dyn ServicePort>> {
        self.service.as_ref().and_then(Weak::upgrade)
    }

    pub fn properties(&self) -> Option<Arc<dyn PropertiesPort>> {
        self.properties.as_ref().and_then(Weak::upgrade)
    }

    pub fn vendor(&self) -> Option<Arc<dyn VendorPort>> {
        self.vendor.as_ref().and_then(Weak::upgrade)
    }

    /// Drop every handle. Subsequent events are ignored.
    pub fn release(&mut self) {
        self.service = None;
        self.properties = None;
        self.vendor = None;
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("service", &self.service().is_some())
            .field("properties", &self.properties().is_some())
            .field("vendor", &self.vendor().is_some())
            .finish()
    }
}
