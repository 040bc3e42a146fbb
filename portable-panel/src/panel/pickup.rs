use bevy::prelude::*;

use super::controller::{PanelContext, PortablePanel};
use super::hooks::PanelNotification;
use super::state::{Carrier, GrabMode};

/// Physics grab collaborator the panel enables and disables.
pub trait PhysicalPickup {
    fn enable_pickup(&mut self);

    fn disable_pickup(&mut self);

    fn sync(&mut self, allowed: bool) {
        if allowed {
            self.enable_pickup();
        } else {
            self.disable_pickup();
        }
    }
}

/// Pickup switch living next to the panel. Physics integrations read
/// `pickupable` and report grabs back as pickup edges.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupModule {
    pub pickupable: bool,
}

impl Default for PickupModule {
    fn default() -> Self {
        Self { pickupable: true }
    }
}

impl PhysicalPickup for PickupModule {
    fn enable_pickup(&mut self) {
        self.pickupable = true;
    }

    fn disable_pickup(&mut self) {
        self.pickupable = false;
    }
}

impl PortablePanel {
    /// The physics pickup grabbed the panel. Opens a closed panel.
    pub fn panel_picked_up(&mut self, ctx: &mut PanelContext, transform: &Transform) {
        if !self.is_started() || !self.pickup_allowed() {
            return;
        }
        if !self.is_open() {
            self.open_panel();
        }
        self.state.attach_pending = false;
        self.state.grab_mode = GrabMode::OneHanded(Carrier::Pickup);
        self.state.current_scale = transform.scale.x;
        self.state.baseline.start_scale = transform.scale.x;
        self.ensure_ownership(ctx);
        self.hooks.on_panel_grab();
        self.notify(PanelNotification::Grabbed);
        debug!("Panel picked up");
    }

    /// The physics pickup released the panel where it currently is.
    pub fn panel_dropped(&mut self, ctx: &mut PanelContext, transform: &Transform) {
        if self.state.grab_mode != GrabMode::OneHanded(Carrier::Pickup) {
            return;
        }
        self.end_manipulation();
        self.state.current_scale = transform.scale.x;
        if self.is_open() {
            self.recache_constraint(ctx.frame, transform);
        }
    }
}
