//! Shared tuning constants for the portable panel.

/// Gesture timing and hand-distance thresholds.
pub mod interaction;

/// Scale limits and desktop placement defaults.
pub mod placement;
