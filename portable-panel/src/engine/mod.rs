//! Bevy integration for the portable panel.
//!
//! The host writes [`crate::panel::TrackingFrame`] every frame and sends
//! discrete input as events. The plugin runs the panel state machine in two
//! passes and publishes lifecycle events back out.
//!
//! ## Frame Flow
//!
//! ```text
//! PreUpdate
//!   ├─> PanelSet::Start    apply settings, start new panels
//!   ├─> PanelSet::Edges    GestureInput / PickupEdge / PanelCommand
//!   └─> PanelSet::Track    carry, two-handed scale, distance close
//! Update                   host systems (write TrackingFrame, send events)
//! PostUpdate
//!   ├─> PanelSet::Place    desktop toggle placement, VR constraints
//!   ├─> PanelSet::Publish  Visibility, PickupModule, PanelEvent
//!   └─> TransformPropagate
//! ```

/// Input edges, commands and published lifecycle events.
pub mod events;

/// `PortablePanelPlugin` and the `PanelSet` system ordering.
pub mod plugin;

/// JSON settings assets and hot-apply.
pub mod settings_loader;

/// Systems bridging ECS data to the panel state machine.
pub mod systems;

pub use events::{GestureInput, PanelAction, PanelCommand, PanelEvent, PickupEdge, PickupEdgeKind};
pub use plugin::{PanelSet, PortablePanelPlugin};
pub use settings_loader::{PanelSettingsAssetPlugin, PanelSettingsHandle};
pub use systems::{DesktopToggleKey, PanelAuthority};
