//! Portable panel: a floating UI panel that can be summoned, grabbed, scaled,
//! carried and dismissed with two-handed VR gestures or a desktop toggle key.
//!
//! `panel` holds the engine-agnostic state machine; `engine` wires it into a
//! Bevy `App`:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use portable_panel::{PanelSettingsAssetPlugin, PortablePanel, PortablePanelPlugin};
//!
//! App::new()
//!     .add_plugins((DefaultPlugins, PortablePanelPlugin, PanelSettingsAssetPlugin))
//!     .add_systems(Startup, |mut commands: Commands| {
//!         commands.spawn((PortablePanel::default(), Transform::from_xyz(0.0, 1.2, -0.5)));
//!     })
//!     .run();
//! ```

pub mod engine;
pub mod panel;

pub use engine::{
    DesktopToggleKey, GestureInput, PanelAction, PanelAuthority, PanelCommand, PanelEvent,
    PanelSet, PanelSettingsAssetPlugin, PanelSettingsHandle, PickupEdge, PickupEdgeKind,
    PortablePanelPlugin,
};
pub use panel::{
    Carrier, CloseBehavior, ConstraintMode, DefaultHooks, DesktopToggleMode, ForceState,
    GestureKind, GestureMode, GrabMode, HandSide, NetworkAuthority, PanelHooks,
    PanelNotification, PanelPhase, PanelSettings, ParticipantId, PhysicalPickup, PickupModule,
    Pose, PortablePanel, TrackingFrame,
};
