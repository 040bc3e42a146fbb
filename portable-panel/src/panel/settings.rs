use bevy::prelude::*;
use constants::interaction::{
    CLOSING_HAND_DISTANCE, GESTURE_SYNC_WINDOW, ONE_HAND_ATTACH_DELAY, STOPPED_SPEED_THRESHOLD,
};
use constants::placement::{
    DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DESKTOP_PANEL_DISTANCE, DESKTOP_PANEL_SCALE,
    MAX_DISTANCE_BEFORE_CLOSING, MIN_CLIP_SAFE_DISTANCE,
};
use serde::{Deserialize, Serialize};

/// Which controller actions count towards the opening gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureMode {
    #[default]
    Grab,
    Trigger,
    /// Grab and trigger must both be held on every hand.
    Both,
}

/// What happens to the panel object when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseBehavior {
    /// Hide the panel.
    #[default]
    Deactivate,
    /// Teleport the panel back to its respawn point and leave it visible.
    Respawn,
}

/// Passive follow behaviour applied to an idle, open VR panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMode {
    #[default]
    None,
    /// Track the player origin's translation, keep the panel's own rotation.
    Position,
    /// Rigidly follow head position and rotation.
    View,
}

/// How the desktop toggle key drives the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesktopToggleMode {
    /// Open while the key is held, close on release.
    #[default]
    TabOnHold,
    /// Each key press flips the panel open or closed.
    Toggle,
}

/// Per-panel tuning, loadable from `*.panel.json` files.
///
/// Distances are in meters and authored for a 1.80m eye height; with
/// `avatar_scaling` enabled they are rescaled to the local avatar.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub gesture_mode: GestureMode,
    /// Whether one-handed carrying and physical pickup start out enabled.
    pub pickupable: bool,
    pub min_scale: f32,
    pub max_scale: f32,
    pub max_distance_before_closing: f32,
    pub closing_hand_distance: f32,
    pub desktop_scale: f32,
    pub desktop_distance: f32,
    pub min_desktop_distance: f32,
    /// Seconds.
    pub gesture_sync_window: f32,
    /// Seconds.
    pub one_hand_attach_delay: f32,
    pub close_behavior: CloseBehavior,
    pub constraint_mode: ConstraintMode,
    pub require_stopped: bool,
    pub stopped_speed_threshold: f32,
    pub avatar_scaling: bool,
    pub desktop_toggle: DesktopToggleMode,
    pub set_owner_on_pickup: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            gesture_mode: GestureMode::Grab,
            pickupable: true,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            max_distance_before_closing: MAX_DISTANCE_BEFORE_CLOSING,
            closing_hand_distance: CLOSING_HAND_DISTANCE,
            desktop_scale: DESKTOP_PANEL_SCALE,
            desktop_distance: DESKTOP_PANEL_DISTANCE,
            min_desktop_distance: MIN_CLIP_SAFE_DISTANCE,
            gesture_sync_window: GESTURE_SYNC_WINDOW,
            one_hand_attach_delay: ONE_HAND_ATTACH_DELAY,
            close_behavior: CloseBehavior::Deactivate,
            constraint_mode: ConstraintMode::None,
            require_stopped: false,
            stopped_speed_threshold: STOPPED_SPEED_THRESHOLD,
            avatar_scaling: true,
            desktop_toggle: DesktopToggleMode::TabOnHold,
            set_owner_on_pickup: false,
        }
    }
}

/// Reasons a settings file is rejected.
#[derive(Debug)]
pub enum SettingsError {
    Json(serde_json::Error),
    NonPositive(&'static str),
    Negative(&'static str),
    InvertedScaleRange { min: f32, max: f32 },
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Json(e) => write!(f, "JSON error: {}", e),
            SettingsError::NonPositive(field) => write!(f, "{} must be greater than zero", field),
            SettingsError::Negative(field) => write!(f, "{} must not be negative", field),
            SettingsError::InvertedScaleRange { min, max } => {
                write!(f, "min_scale {} is larger than max_scale {}", min, max)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl PanelSettings {
    /// Parse and validate settings without going through the asset server.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: PanelSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("max_distance_before_closing", self.max_distance_before_closing),
            ("desktop_scale", self.desktop_scale),
            ("desktop_distance", self.desktop_distance),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::NonPositive(field));
            }
        }

        let non_negative = [
            ("closing_hand_distance", self.closing_hand_distance),
            ("min_desktop_distance", self.min_desktop_distance),
            ("gesture_sync_window", self.gesture_sync_window),
            ("one_hand_attach_delay", self.one_hand_attach_delay),
            ("stopped_speed_threshold", self.stopped_speed_threshold),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(SettingsError::Negative(field));
            }
        }

        if self.min_scale > self.max_scale {
            return Err(SettingsError::InvertedScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = PanelSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, PanelSettings::default());
    }

    #[test]
    fn enum_fields_use_snake_case() {
        let settings = PanelSettings::from_json_str(
            r#"{
                "gesture_mode": "both",
                "close_behavior": "respawn",
                "constraint_mode": "view",
                "desktop_toggle": "toggle",
                "max_scale": 2.0
            }"#,
        )
        .unwrap();
        assert_eq!(settings.gesture_mode, GestureMode::Both);
        assert_eq!(settings.close_behavior, CloseBehavior::Respawn);
        assert_eq!(settings.constraint_mode, ConstraintMode::View);
        assert_eq!(settings.desktop_toggle, DesktopToggleMode::Toggle);
        assert_eq!(settings.max_scale, 2.0);
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let err = PanelSettings::from_json_str(r#"{ "min_scale": 3.0, "max_scale": 2.0 }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvertedScaleRange { .. }));
    }

    #[test]
    fn zero_min_scale_is_rejected() {
        let err = PanelSettings::from_json_str(r#"{ "min_scale": 0.0 }"#).unwrap_err();
        assert_eq!(err.to_string(), "min_scale must be greater than zero");
    }

    #[test]
    fn malformed_json_reports_json_error() {
        let err = PanelSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }
}
