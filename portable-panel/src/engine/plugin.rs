use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::render::view::VisibilitySystems;
use bevy::transform::TransformSystem;

use super::events::{GestureInput, PanelCommand, PanelEvent, PickupEdge};
use super::systems::{
    DesktopToggleKey, handle_gesture_input, handle_panel_commands, handle_pickup_edges,
    place_panels, publish_panel_events, start_panels, sync_panel_visibility, sync_pickup_modules,
    track_panels,
};
use crate::panel::tracking::TrackingFrame;

/// Ordering of the panel systems within a frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSet {
    /// Capture baselines of new panels. `PreUpdate`.
    Start,
    /// Gesture, pickup and command edges. `PreUpdate`.
    Edges,
    /// Continuous VR tracking. `PreUpdate`.
    Track,
    /// Desktop placement and constraints. `PostUpdate`.
    Place,
    /// Visibility, pickup sync and lifecycle events. `PostUpdate`.
    Publish,
}

// Registers panel resources, events and the early / late passes.
pub struct PortablePanelPlugin;

impl Plugin for PortablePanelPlugin {
    fn build(&self, app: &mut App) {
        app
            // init resources
            .init_resource::<TrackingFrame>()
            .init_resource::<DesktopToggleKey>()
            .add_event::<GestureInput>()
            .add_event::<PickupEdge>()
            .add_event::<PanelCommand>()
            .add_event::<PanelEvent>()
            .configure_sets(
                PreUpdate,
                (PanelSet::Start, PanelSet::Edges, PanelSet::Track)
                    .chain()
                    .after(InputSystem),
            )
            .configure_sets(
                PostUpdate,
                (PanelSet::Place, PanelSet::Publish)
                    .chain()
                    .before(TransformSystem::TransformPropagate)
                    .before(VisibilitySystems::VisibilityPropagate),
            )
            .add_systems(
                PreUpdate,
                (
                    start_panels.in_set(PanelSet::Start),
                    (handle_gesture_input, handle_pickup_edges, handle_panel_commands)
                        .chain()
                        .in_set(PanelSet::Edges),
                    track_panels.in_set(PanelSet::Track),
                ),
            )
            .add_systems(
                PostUpdate,
                (
                    place_panels.in_set(PanelSet::Place),
                    (sync_panel_visibility, sync_pickup_modules, publish_panel_events)
                        .in_set(PanelSet::Publish),
                ),
            );
    }
}
