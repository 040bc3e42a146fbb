use bevy::prelude::*;

use crate::panel::gesture::{GestureChannel, GestureKind};
use crate::panel::hooks::PanelNotification;
use crate::panel::settings::ConstraintMode;
use crate::panel::state::HandSide;

/// A gesture channel on one controller changed state.
///
/// Delivered to every panel; VR input integrations write these from their
/// controller bindings.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureInput {
    pub hand: HandSide,
    pub kind: GestureKind,
    pub pressed: bool,
}

impl GestureInput {
    pub fn channel(&self) -> GestureChannel {
        GestureChannel::new(self.kind, self.hand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEdgeKind {
    Begin,
    End,
}

/// The physics pickup grabbed or released a panel.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupEdge {
    pub panel: Entity,
    pub kind: PickupEdgeKind,
}

/// Operations other code can request on a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    ForceOpen,
    ForceClose,
    Toggle,
    Respawn,
    SetLocked(bool),
    SetPickupable(bool),
    TogglePickupable,
    SetConstraintMode(ConstraintMode),
    /// Use the panel's current transform as its new respawn point.
    SetRespawnPoint,
}

/// Request fired by UI, scripts or keyboard shortcuts.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PanelCommand {
    /// Target panel, or every panel when `None`.
    pub panel: Option<Entity>,
    pub action: PanelAction,
}

impl PanelCommand {
    pub fn all(action: PanelAction) -> Self {
        Self { panel: None, action }
    }

    pub fn to(panel: Entity, action: PanelAction) -> Self {
        Self {
            panel: Some(panel),
            action,
        }
    }

    pub fn targets(&self, panel: Entity) -> bool {
        self.panel.is_none_or(|target| target == panel)
    }
}

/// Lifecycle notification published after the late pass.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PanelEvent {
    pub panel: Entity,
    pub notification: PanelNotification,
}
