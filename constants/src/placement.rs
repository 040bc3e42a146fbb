use bevy::math::Vec3;

pub const DEFAULT_MIN_SCALE: f32 = 0.1;
pub const DEFAULT_MAX_SCALE: f32 = 9999.0;

/// Head-to-panel distance (meters) past which an idle VR panel closes.
pub const MAX_DISTANCE_BEFORE_CLOSING: f32 = 2.0;

/// Desktop panel scale and its distance in front of the head.
pub const DESKTOP_PANEL_SCALE: f32 = 0.5;
pub const DESKTOP_PANEL_DISTANCE: f32 = 0.3;

/// Closest a desktop panel may sit to the head without near-plane clipping.
pub const MIN_CLIP_SAFE_DISTANCE: f32 = 0.1;

/// World up used when turning a panel towards the viewer.
pub const PANEL_UP: Vec3 = Vec3::Y;
