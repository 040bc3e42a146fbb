use bevy::prelude::*;

use super::events::{GestureInput, PanelAction, PanelCommand, PanelEvent, PickupEdge, PickupEdgeKind};
use crate::panel::controller::{DesktopToggleInput, PanelContext, PortablePanel};
use crate::panel::hooks::NetworkAuthority;
use crate::panel::pickup::{PhysicalPickup, PickupModule};
use crate::panel::state::RespawnPoint;
use crate::panel::tracking::TrackingFrame;

/// Ownership collaborator; panels skip ownership requests when absent.
#[derive(Resource)]
pub struct PanelAuthority(pub Box<dyn NetworkAuthority + Send + Sync>);

/// Key that summons the panel in desktop mode.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopToggleKey(pub KeyCode);

impl Default for DesktopToggleKey {
    fn default() -> Self {
        Self(KeyCode::Tab)
    }
}

fn panel_context<'a>(
    panel: Entity,
    frame: &'a TrackingFrame,
    time: &Time,
    authority: Option<&'a mut PanelAuthority>,
) -> PanelContext<'a> {
    let ctx = PanelContext::new(panel, frame, time.elapsed_secs());
    match authority {
        Some(authority) => ctx.with_authority(authority.0.as_mut()),
        None => ctx,
    }
}

/// Capture baselines for panels spawned since the last frame.
pub fn start_panels(mut panels: Query<(&mut PortablePanel, &Transform), Added<PortablePanel>>) {
    for (mut panel, transform) in &mut panels {
        panel.start(transform);
    }
}

/// Every panel sees every gesture edge.
pub fn handle_gesture_input(
    mut inputs: EventReader<GestureInput>,
    frame: Res<TrackingFrame>,
    time: Res<Time>,
    mut authority: Option<ResMut<PanelAuthority>>,
    mut panels: Query<(Entity, &mut PortablePanel, &mut Transform)>,
) {
    for input in inputs.read() {
        for (entity, mut panel, mut transform) in &mut panels {
            let mut ctx = panel_context(entity, &frame, &time, authority.as_deref_mut());
            panel.handle_gesture_edge(&mut ctx, &mut transform, input.channel(), input.pressed);
        }
    }
}

pub fn handle_pickup_edges(
    mut edges: EventReader<PickupEdge>,
    frame: Res<TrackingFrame>,
    time: Res<Time>,
    mut authority: Option<ResMut<PanelAuthority>>,
    mut panels: Query<(&mut PortablePanel, &Transform)>,
) {
    for edge in edges.read() {
        let Ok((mut panel, transform)) = panels.get_mut(edge.panel) else {
            warn!("Pickup edge for unknown panel {:?}", edge.panel);
            continue;
        };
        let mut ctx = panel_context(edge.panel, &frame, &time, authority.as_deref_mut());
        match edge.kind {
            PickupEdgeKind::Begin => panel.panel_picked_up(&mut ctx, transform),
            PickupEdgeKind::End => panel.panel_dropped(&mut ctx, transform),
        }
    }
}

pub fn handle_panel_commands(
    mut requests: EventReader<PanelCommand>,
    frame: Res<TrackingFrame>,
    time: Res<Time>,
    mut authority: Option<ResMut<PanelAuthority>>,
    mut panels: Query<(Entity, &mut PortablePanel, &mut Transform)>,
) {
    for command in requests.read() {
        for (entity, mut panel, mut transform) in &mut panels {
            if !command.targets(entity) {
                continue;
            }
            debug!("Panel {:?} command {:?}", entity, command.action);

            let mut ctx = panel_context(entity, &frame, &time, authority.as_deref_mut());
            match command.action {
                PanelAction::ForceOpen => panel.force_open(&mut ctx, &mut transform),
                PanelAction::ForceClose => panel.force_close(&mut transform),
                PanelAction::Toggle => panel.toggle(&mut ctx, &mut transform),
                PanelAction::Respawn => panel.respawn(&mut ctx, &mut transform),
                PanelAction::SetLocked(locked) => panel.set_locked(locked, &frame, &transform),
                PanelAction::SetPickupable(pickupable) => panel.set_pickupable(pickupable),
                PanelAction::TogglePickupable => panel.toggle_pickupable(),
                PanelAction::SetConstraintMode(mode) => {
                    panel.set_constraint_mode(mode, &frame, &transform)
                }
                PanelAction::SetRespawnPoint => {
                    panel.set_respawn_point(RespawnPoint::from_transform(&transform))
                }
            }
        }
    }
}

/// Early pass: carry, two-handed scaling and distance closing.
pub fn track_panels(
    frame: Res<TrackingFrame>,
    time: Res<Time>,
    mut authority: Option<ResMut<PanelAuthority>>,
    mut panels: Query<(Entity, &mut PortablePanel, &mut Transform)>,
) {
    for (entity, mut panel, mut transform) in &mut panels {
        let mut ctx = panel_context(entity, &frame, &time, authority.as_deref_mut());
        panel.early_update(&mut ctx, &mut transform);
    }
}

/// Late pass: desktop placement and VR constraints, after the head pose is final.
pub fn place_panels(
    frame: Res<TrackingFrame>,
    time: Res<Time>,
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    toggle_key: Res<DesktopToggleKey>,
    mut authority: Option<ResMut<PanelAuthority>>,
    mut panels: Query<(Entity, &mut PortablePanel, &mut Transform)>,
) {
    let toggle = keyboard
        .map(|keys| DesktopToggleInput {
            held: keys.pressed(toggle_key.0),
            just_pressed: keys.just_pressed(toggle_key.0),
        })
        .unwrap_or_default();

    for (entity, mut panel, mut transform) in &mut panels {
        let mut ctx = panel_context(entity, &frame, &time, authority.as_deref_mut());
        panel.late_update(&mut ctx, &mut transform, toggle);
    }
}

pub fn sync_panel_visibility(mut panels: Query<(&PortablePanel, &mut Visibility)>) {
    for (panel, mut visibility) in &mut panels {
        let wanted = if panel.is_active() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

/// Mirror the pickupable flag (and lock) onto the physics pickup switch.
pub fn sync_pickup_modules(mut panels: Query<(&PortablePanel, &mut PickupModule)>) {
    for (panel, mut module) in &mut panels {
        let allowed = panel.pickup_allowed();
        if module.pickupable != allowed {
            module.sync(allowed);
        }
    }
}

pub fn publish_panel_events(
    mut panels: Query<(Entity, &mut PortablePanel)>,
    mut events: EventWriter<PanelEvent>,
) {
    for (entity, mut panel) in &mut panels {
        for notification in panel.drain_notifications() {
            events.write(PanelEvent {
                panel: entity,
                notification,
            });
        }
    }
}
