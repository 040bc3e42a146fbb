use bevy::prelude::*;

/// Lifecycle callbacks a content collaborator can implement.
///
/// The opening and closing callbacks may veto by returning `false`: a vetoed
/// opening still marks the panel open but skips showing it, a vetoed natural
/// closing leaves the panel open.
pub trait PanelHooks {
    fn on_start(&mut self) {}

    fn on_panel_opening(&mut self) -> bool {
        true
    }

    fn on_panel_closing(&mut self) -> bool {
        true
    }

    fn on_panel_grab(&mut self) {}

    fn on_panel_drop(&mut self) {}

    fn on_panel_scaled(&mut self, _old_scale: f32, _new_scale: f32) {}
}

/// Hooks that accept everything and do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl PanelHooks for DefaultHooks {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(pub u64);

/// Distributed-ownership collaborator, asked before the local participant
/// starts writing the panel transform.
pub trait NetworkAuthority {
    fn local_participant(&self) -> ParticipantId;

    fn is_owner(&self, panel: Entity) -> bool;

    fn set_owner(&mut self, participant: ParticipantId, panel: Entity);
}

/// Lifecycle notifications queued for the engine to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelNotification {
    Opened,
    Closed,
    Grabbed,
    Dropped,
    Scaled { old_scale: f32, new_scale: f32 },
}
