use bevy::prelude::*;

use super::settings::ConstraintMode;
use super::tracking::TrackingFrame;

/// Cached offset that an idle panel is held at relative to the player.
///
/// Captured when a grab ends or the constraint mode is (re)enabled, never
/// continuously, so the panel does not drift while it follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintOffset {
    /// World-space offset from the player origin.
    Position(Vec3),
    /// Panel pose in head space.
    View { position: Vec3, rotation: Quat },
}

impl ConstraintOffset {
    pub fn capture(mode: ConstraintMode, frame: &TrackingFrame, panel: &Transform) -> Option<Self> {
        match mode {
            ConstraintMode::None => None,
            ConstraintMode::Position => Some(ConstraintOffset::Position(
                panel.translation - frame.player_origin.position,
            )),
            ConstraintMode::View => {
                let inverse = frame.head.rotation.inverse();
                Some(ConstraintOffset::View {
                    position: inverse * (panel.translation - frame.head.position),
                    rotation: inverse * panel.rotation,
                })
            }
        }
    }

    pub fn apply(&self, frame: &TrackingFrame, panel: &mut Transform) {
        match *self {
            ConstraintOffset::Position(offset) => {
                panel.translation = frame.player_origin.position + offset;
            }
            ConstraintOffset::View { position, rotation } => {
                panel.translation = frame.head.position + frame.head.rotation * position;
                panel.rotation = frame.head.rotation * rotation;
            }
        }
    }

    pub fn mode(&self) -> ConstraintMode {
        match self {
            ConstraintOffset::Position(_) => ConstraintMode::Position,
            ConstraintOffset::View { .. } => ConstraintMode::View,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::tracking::Pose;

    #[test]
    fn position_constraint_tracks_translation_only() {
        let mut frame = TrackingFrame::default();
        let mut panel = Transform::from_xyz(1.0, 1.5, -1.0).with_rotation(Quat::from_rotation_z(0.4));
        let offset = ConstraintOffset::capture(ConstraintMode::Position, &frame, &panel).unwrap();

        frame.player_origin = Pose::new(Vec3::new(5.0, 0.0, 2.0), Quat::from_rotation_y(1.0));
        offset.apply(&frame, &mut panel);

        assert!(panel.translation.distance(Vec3::new(6.0, 1.5, 1.0)) < 1e-5);
        assert!(panel.rotation.angle_between(Quat::from_rotation_z(0.4)) < 1e-5);
    }

    #[test]
    fn view_constraint_follows_head_rigidly() {
        let mut frame = TrackingFrame::default();
        let mut panel = Transform::from_xyz(0.0, 1.6, -0.5);
        let offset = ConstraintOffset::capture(ConstraintMode::View, &frame, &panel).unwrap();

        frame.head = Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::from_rotation_y(std::f32::consts::PI));
        offset.apply(&frame, &mut panel);

        assert!(panel.translation.distance(Vec3::new(0.0, 1.6, 0.5)) < 1e-5);
        assert!(panel.rotation.angle_between(frame.head.rotation) < 1e-5);
    }

    #[test]
    fn none_mode_captures_nothing() {
        let frame = TrackingFrame::default();
        assert!(ConstraintOffset::capture(ConstraintMode::None, &frame, &Transform::default()).is_none());
    }
}
