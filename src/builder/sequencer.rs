//! Builder for constructing sequencers.

use crate::builder::error::BuildError;
use crate::config::SequencerConfig;
use crate::shell::{
    Collaborators, Dispatcher, PropertiesPort, SequencerHandle, ServicePort, TimerDriver,
    VendorPort,
};
use std::sync::{Arc, Weak};

/// Builder for a sequencer with a fluent API.
///
/// Collaborators are taken by reference and held weakly: the caller keeps
/// ownership, and dropping them is how shutdown is signalled.
#[derive(Default)]
pub struct SequencerBuilder {
    service: Option<Weak<dyn ServicePort>>,
    properties: Option<Weak<dyn PropertiesPort>>,
    vendor: Option<Weak<dyn VendorPort>>,
    config: SequencerConfig,
}

impl SequencerBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service (required).
    pub fn service<S: ServicePort + 'static>(mut self, service: &Arc<S>) -> Self {
        let weak: Weak<S> = Arc::downgrade(service);
        self.service = Some(weak);
        self
    }

    /// Set the properties store (required).
    pub fn properties<P: PropertiesPort + 'static>(mut self, properties: &Arc<P>) -> Self {
        let weak: Weak<P> = Arc::downgrade(properties);
        self.properties = Some(weak);
        self
    }

    /// Set the vendor hooks (required).
    pub fn vendor<V: VendorPort + 'static>(mut self, vendor: &Arc<V>) -> Self {
        let weak: Weak<V> = Arc::downgrade(vendor);
        self.vendor = Some(weak);
        self
    }

    pub fn config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a dispatcher driven by the caller, scheduling timers on `timers`.
    pub fn build_dispatcher<T: TimerDriver>(self, timers: T) -> Result<Dispatcher<T>, BuildError> {
        let (collaborators, config) = self.parts()?;
        Ok(Dispatcher::new(collaborators, timers, &config))
    }

    /// Spawn the sequencer on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn(self) -> Result<SequencerHandle, BuildError> {
        let (collaborators, config) = self.parts()?;
        Ok(crate::shell::runtime::spawn(collaborators, &config))
    }

    fn parts(self) -> Result<(Collaborators, SequencerConfig), BuildError> {
        let service = self.service.ok_or(BuildError::MissingService)?;
        let properties = self.properties.ok_or(BuildError::MissingProperties)?;
        let vendor = self.vendor.ok_or(BuildError::MissingVendor)?;
        let config = self.config.validated()?;
        Ok((Collaborators::new(service, properties, vendor), config))
    }
}
