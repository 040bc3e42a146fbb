use bevy::prelude::*;
use constants::interaction::{MIN_BASELINE_SPREAD, REFERENCE_EYE_HEIGHT};

use super::gesture::Handedness;
use super::settings::PanelSettings;
use super::tracking::TrackingFrame;

/// Ratio of the local avatar's eye height to the reference height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarScale(f32);

impl AvatarScale {
    pub const IDENTITY: Self = Self(1.0);

    /// Falls back to identity when disabled, when the height query is unsafe
    /// (`None`), or when the reported height is not a positive number.
    pub fn from_eye_height(eye_height: Option<f32>, enabled: bool) -> Self {
        match eye_height {
            Some(height) if enabled && height > 0.0 && height.is_finite() => {
                Self(height / REFERENCE_EYE_HEIGHT)
            }
            _ => Self::IDENTITY,
        }
    }

    pub fn for_frame(frame: &TrackingFrame, settings: &PanelSettings) -> Self {
        Self::from_eye_height(frame.avatar_eye_height, settings.avatar_scaling)
    }

    pub fn factor(self) -> f32 {
        self.0
    }

    pub fn apply(self, value: f32) -> f32 {
        value * self.0
    }
}

/// Avatar-scaled `[min, max]` uniform scale range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f32,
    pub max: f32,
}

impl ScaleLimits {
    pub fn new(settings: &PanelSettings, avatar: AvatarScale) -> Self {
        Self {
            min: avatar.apply(settings.min_scale),
            max: avatar.apply(settings.max_scale),
        }
    }

    /// Never panics, unlike `f32::clamp`; `max` wins if the range is inverted.
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.max(self.min).min(self.max)
    }
}

/// Current manipulation spread and the point the panel centres on.
///
/// Two hands: their distance and midpoint. One controller: twice the
/// distance travelled from `origin`, centred on `origin` (the virtual second
/// hand is mirrored there).
pub fn current_spread(
    handedness: Handedness,
    frame: &TrackingFrame,
    origin: Vec3,
) -> Option<(f32, Vec3)> {
    match handedness {
        Handedness::TwoHanded => {
            let left = frame.left_hand.position;
            let right = frame.right_hand.position;
            Some((left.distance(right), (left + right) * 0.5))
        }
        Handedness::OneController(side) => {
            let hand = frame.hand(side).position;
            Some((2.0 * hand.distance(origin), origin))
        }
        Handedness::NoController => None,
    }
}

/// Two-handed scale from the grab baseline.
///
/// Scales by `spread / start_spread`; with a zero baseline (one-controller
/// grab) spread maps one to one onto scale instead.
pub fn two_handed_scale(
    start_scale: f32,
    start_spread: f32,
    spread: f32,
    limits: &ScaleLimits,
) -> f32 {
    let raw = if start_spread > MIN_BASELINE_SPREAD {
        start_scale * spread / start_spread
    } else {
        start_scale + (spread - start_spread)
    };
    limits.clamp(raw)
}
