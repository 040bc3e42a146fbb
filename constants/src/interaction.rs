/// Eye height (meters) that every avatar-scaled threshold is authored against.
pub const REFERENCE_EYE_HEIGHT: f32 = 1.80;

/// Hand separation (meters) below which a two-handed gesture may open a closed
/// panel, and below which a dropped panel closes itself.
pub const CLOSING_HAND_DISTANCE: f32 = 0.24;

/// Maximum time (seconds) between the first and the last channel of an opening gesture.
pub const GESTURE_SYNC_WINDOW: f32 = 0.25;

/// Delay (seconds) before a two-handed hold falls back to a one-handed carry.
pub const ONE_HAND_ATTACH_DELAY: f32 = 0.1;

/// Player speed (units per second) above which `require_stopped` blocks new gestures.
pub const STOPPED_SPEED_THRESHOLD: f32 = 1.0;

/// Baseline spreads below this are treated as zero.
pub const MIN_BASELINE_SPREAD: f32 = 1e-4;
