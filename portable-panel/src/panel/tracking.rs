use bevy::prelude::*;

use super::state::HandSide;

/// A tracked position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Viewing direction, local -Z.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl From<&Transform> for Pose {
    fn from(transform: &Transform) -> Self {
        Self::new(transform.translation, transform.rotation)
    }
}

/// Per-frame pose sample written by the host before the panel systems run.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct TrackingFrame {
    /// Whether the local participant is in VR; desktop mode otherwise.
    pub in_vr: bool,
    pub head: Pose,
    pub left_hand: Pose,
    pub right_hand: Pose,
    /// The player's tracking origin (feet / playspace root).
    pub player_origin: Pose,
    pub player_velocity: Vec3,
    pub left_connected: bool,
    pub right_connected: bool,
    /// Local avatar eye height, `None` where the query is not safe to make.
    pub avatar_eye_height: Option<f32>,
}

impl Default for TrackingFrame {
    fn default() -> Self {
        Self {
            in_vr: false,
            head: Pose::from_position(Vec3::new(0.0, 1.6, 0.0)),
            left_hand: Pose::IDENTITY,
            right_hand: Pose::IDENTITY,
            player_origin: Pose::IDENTITY,
            player_velocity: Vec3::ZERO,
            left_connected: false,
            right_connected: false,
            avatar_eye_height: None,
        }
    }
}

impl TrackingFrame {
    pub fn hand(&self, side: HandSide) -> Pose {
        match side {
            HandSide::Left => self.left_hand,
            HandSide::Right => self.right_hand,
        }
    }

    pub fn player_speed(&self) -> f32 {
        self.player_velocity.length()
    }
}
