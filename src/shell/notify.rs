//! Public state announcements.

use crate::core::PublicState;
use crate::shell::ports::Collaborators;
use tracing::{error, info};

/// Persist `new` as the public state and tell the service about the change.
///
/// A no-op when either collaborator is gone.
pub fn notify_state_change(collaborators: &Collaborators, new: PublicState) {
    let (Some(service), Some(properties)) = (collaborators.service(), collaborators.properties())
    else {
        error!(state = %new, "state change after cleanup, not announced");
        return;
    };

    let old = properties.public_state();
    properties.set_public_state(new);
    info!(%old, %new, "adapter state changed");
    service.on_public_state_changed(old, new);
}
