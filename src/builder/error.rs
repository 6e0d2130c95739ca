//! Build errors for the sequencer builder.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur when building a sequencer.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Service not specified. Call .service(&service) before building")]
    MissingService,

    #[error("Properties not specified. Call .properties(&properties) before building")]
    MissingProperties,

    #[error("Vendor hooks not specified. Call .vendor(&vendor) before building")]
    MissingVendor,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}
