use bevy::prelude::*;
use constants::placement::PANEL_UP;

use super::scale::{AvatarScale, ScaleLimits};
use super::settings::PanelSettings;
use super::tracking::Pose;

/// Rotation that turns the panel's front face (local +Z) towards `head`.
pub fn facing_head(position: Vec3, head: Vec3) -> Quat {
    let away = position - head;
    if away.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Transform::from_translation(position)
        .looking_to(away, PANEL_UP)
        .rotation
}

/// Panel pose expressed in the carrying hand's space.
pub fn hand_offset(hand: Pose, panel: &Transform) -> (Vec3, Quat) {
    let inverse = hand.rotation.inverse();
    (
        inverse * (panel.translation - hand.position),
        inverse * panel.rotation,
    )
}

/// Re-derive the carried panel pose from the current hand pose.
pub fn carried_pose(hand: Pose, offset_position: Vec3, offset_rotation: Quat) -> (Vec3, Quat) {
    (
        hand.position + hand.rotation * offset_position,
        hand.rotation * offset_rotation,
    )
}

/// Distance in front of the head and uniform scale of a desktop panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesktopPlacement {
    pub distance: f32,
    pub scale: f32,
}

impl DesktopPlacement {
    /// Avatar-scaled placement. Distance and scale move together so the
    /// apparent size (scale / distance) survives both the near-clip floor and
    /// the minimum scale floor.
    pub fn new(settings: &PanelSettings, avatar: AvatarScale) -> Self {
        let mut distance = avatar.apply(settings.desktop_distance);
        let mut scale = avatar.apply(settings.desktop_scale);

        if distance < settings.min_desktop_distance && distance > 0.0 {
            let ratio = settings.min_desktop_distance / distance;
            distance *= ratio;
            scale *= ratio;
        }

        let limits = ScaleLimits::new(settings, avatar);
        if scale < limits.min && scale > 0.0 {
            let ratio = limits.min / scale;
            distance *= ratio;
            scale = limits.min;
        }

        Self {
            distance,
            scale: scale.min(limits.max),
        }
    }

    /// Put the panel straight ahead of the head, facing it.
    pub fn apply(&self, head: Pose, transform: &mut Transform) {
        let position = head.position + head.forward() * self.distance;
        transform.translation = position;
        transform.rotation = facing_head(position, head.position);
        transform.scale = Vec3::splat(self.scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn panel_front_faces_the_head() {
        let head = Vec3::new(0.0, 1.6, 0.0);
        let position = Vec3::new(0.0, 1.6, -1.0);
        let rotation = facing_head(position, head);
        let front = rotation * Vec3::Z;
        assert!(approx(front, (head - position).normalize()));
    }

    #[test]
    fn carry_offset_round_trips() {
        let hand = Pose::new(Vec3::new(0.3, 1.2, -0.2), Quat::from_rotation_y(0.8));
        let panel = Transform::from_xyz(0.1, 1.4, -0.6).with_rotation(Quat::from_rotation_x(0.3));
        let (offset_position, offset_rotation) = hand_offset(hand, &panel);
        let (position, rotation) = carried_pose(hand, offset_position, offset_rotation);
        assert!(approx(position, panel.translation));
        assert!(rotation.abs_diff_eq(panel.rotation, 1e-5));
    }

    #[test]
    fn desktop_placement_is_ahead_of_the_head() {
        let settings = PanelSettings::default();
        let placement = DesktopPlacement::new(&settings, AvatarScale::IDENTITY);
        let head = Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let mut transform = Transform::default();
        placement.apply(head, &mut transform);

        // Quarter turn left: forward is -X.
        assert!(approx(transform.translation, Vec3::new(-settings.desktop_distance, 1.6, 0.0)));
        assert_eq!(transform.scale, Vec3::splat(settings.desktop_scale));
    }

    #[test]
    fn tiny_avatar_pushes_panel_out_to_clip_distance() {
        let settings = PanelSettings {
            desktop_distance: 0.3,
            desktop_scale: 0.5,
            min_desktop_distance: 0.1,
            min_scale: 0.01,
            ..default()
        };
        let avatar = AvatarScale::from_eye_height(Some(0.3), true);
        let placement = DesktopPlacement::new(&settings, avatar);
        assert!((placement.distance - 0.1).abs() < 1e-5);
        // Apparent size matches the unscaled placement.
        let apparent = placement.scale / placement.distance;
        assert!((apparent - 0.5 / 0.3).abs() < 1e-4);
    }

    #[test]
    fn min_scale_floor_moves_the_panel_back() {
        let settings = PanelSettings {
            desktop_distance: 0.3,
            desktop_scale: 0.05,
            min_desktop_distance: 0.0,
            min_scale: 0.1,
            ..default()
        };
        let placement = DesktopPlacement::new(&settings, AvatarScale::IDENTITY);
        assert!((placement.scale - 0.1).abs() < 1e-6);
        assert!((placement.distance - 0.6).abs() < 1e-5);
    }
}
