use bevy::prelude::*;

use super::constraint::ConstraintOffset;
use super::gesture::TriggeredInputs;
use super::settings::ConstraintMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    pub fn other(self) -> Self {
        match self {
            HandSide::Left => HandSide::Right,
            HandSide::Right => HandSide::Left,
        }
    }
}

/// What carries a one-handed panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    /// A tracked hand; the panel keeps a fixed pose relative to it.
    Hand(HandSide),
    /// The physics pickup, which owns the transform while held.
    Pickup,
}

/// Which manipulation currently owns the panel transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabMode {
    #[default]
    None,
    OneHanded(Carrier),
    TwoHanded,
}

impl GrabMode {
    pub fn is_held(&self) -> bool {
        !matches!(self, GrabMode::None)
    }
}

/// Desktop override of the toggle key, latched until the key state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceState {
    #[default]
    None,
    ForceClosed,
    ForceOpen,
}

/// Coarse state derived from the open flag and grab mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Closed,
    OpenIdle,
    OpenOneHanded,
    OpenTwoHanded,
}

/// Manipulation baselines, only meaningful while the panel is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabBaseline {
    pub start_hand_spread: f32,
    pub start_scale: f32,
    /// Grab-start point of the single tracked hand in the one-controller fallback.
    pub one_handed_origin: Vec3,
    /// Panel pose in the carrying hand's space.
    pub offset_position: Vec3,
    pub offset_rotation: Quat,
}

impl Default for GrabBaseline {
    fn default() -> Self {
        Self {
            start_hand_spread: 0.0,
            start_scale: 1.0,
            one_handed_origin: Vec3::ZERO,
            offset_position: Vec3::ZERO,
            offset_rotation: Quat::IDENTITY,
        }
    }
}

/// Pose and uniform scale the panel returns to on respawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnPoint {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl RespawnPoint {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
            scale: transform.scale.x,
        }
    }

    pub fn apply(&self, transform: &mut Transform) {
        transform.translation = self.position;
        transform.rotation = self.rotation;
        transform.scale = Vec3::splat(self.scale);
    }
}

/// Mutable state of a single panel. Reset on close and respawn, never freed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub is_open: bool,
    /// Whether the panel object is shown; diverges from `is_open` under vetoes
    /// and with the respawning close behaviour.
    pub is_active: bool,
    pub grab_mode: GrabMode,
    pub force_state: ForceState,
    /// Toggle key state at the moment `force_state` latched.
    pub force_latch_key_held: bool,
    pub constraint_mode: ConstraintMode,
    pub is_locked: bool,
    pub is_pickupable: bool,
    pub respawn: Option<RespawnPoint>,
    pub baseline: GrabBaseline,
    pub constraint_offset: Option<ConstraintOffset>,
    pub triggered: TriggeredInputs,
    /// Deferred two-hand to one-hand attach; cleared on delivery.
    pub attach_pending: bool,
    pub attach_due_at: f32,
    pub current_scale: f32,
}

impl PanelState {
    pub fn phase(&self) -> PanelPhase {
        if !self.is_open {
            return PanelPhase::Closed;
        }
        match self.grab_mode {
            GrabMode::None => PanelPhase::OpenIdle,
            GrabMode::OneHanded(_) => PanelPhase::OpenOneHanded,
            GrabMode::TwoHanded => PanelPhase::OpenTwoHanded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_open_flag_and_grab_mode() {
        let mut state = PanelState::default();
        assert_eq!(state.phase(), PanelPhase::Closed);

        state.is_open = true;
        assert_eq!(state.phase(), PanelPhase::OpenIdle);

        state.grab_mode = GrabMode::OneHanded(Carrier::Hand(HandSide::Left));
        assert_eq!(state.phase(), PanelPhase::OpenOneHanded);

        state.grab_mode = GrabMode::TwoHanded;
        assert_eq!(state.phase(), PanelPhase::OpenTwoHanded);
    }

    #[test]
    fn respawn_point_restores_uniform_scale() {
        let spawn = Transform::from_xyz(1.0, 2.0, 3.0)
            .with_rotation(Quat::from_rotation_y(0.5))
            .with_scale(Vec3::splat(0.7));
        let point = RespawnPoint::from_transform(&spawn);

        let mut moved = Transform::from_xyz(-4.0, 0.0, 9.0).with_scale(Vec3::splat(3.0));
        point.apply(&mut moved);
        assert_eq!(moved, spawn);
    }
}
