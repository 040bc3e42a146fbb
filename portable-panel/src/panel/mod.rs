//! Engine-agnostic core of the portable panel.
//!
//! Everything in here works on plain values (`Transform`, [`TrackingFrame`],
//! gesture edges) so the state machine can be driven and tested without an
//! `App`. The Bevy integration in `crate::engine` only gathers input, calls
//! into [`PortablePanel`] and publishes what it reports.
//!
//! ## Lifecycle
//!
//! ```text
//!            two-hand gesture (hands close together)
//!   Closed ──────────────────────────────────────────> OpenTwoHanded
//!     ^                                                  │   ^
//!     │ drop below closing distance,                     │   │ both hands again
//!     │ walk away, force close                           v   │
//!     │                                             OpenOneHanded
//!     │                                                  │
//!     └──────────────────── OpenIdle <───────────────────┘
//!                                     release all hands
//! ```
//!
//! ## Modules
//!
//! - `settings`: serde-backed tuning asset plus validation errors
//! - `tracking`: per-frame head, hand and player poses
//! - `gesture`: channel masks, opening-gesture recognition
//! - `scale`: avatar scaling, scale limits and two-handed spread
//! - `placement`: facing, carry offsets and desktop placement
//! - `constraint`: cached offsets for position / view following
//! - `hooks`: lifecycle callbacks and the ownership collaborator
//! - `controller`: the [`PortablePanel`] state machine
//! - `pickup`: physics pickup collaborator

pub mod constraint;
pub mod controller;
pub mod gesture;
pub mod hooks;
pub mod pickup;
pub mod placement;
pub mod scale;
pub mod settings;
pub mod state;
pub mod tracking;

pub use controller::{DesktopToggleInput, PanelContext, PortablePanel};
pub use gesture::{GestureChannel, GestureKind};
pub use hooks::{DefaultHooks, NetworkAuthority, PanelHooks, PanelNotification, ParticipantId};
pub use pickup::{PhysicalPickup, PickupModule};
pub use settings::{
    CloseBehavior, ConstraintMode, DesktopToggleMode, GestureMode, PanelSettings, SettingsError,
};
pub use state::{Carrier, ForceState, GrabMode, HandSide, PanelPhase, RespawnPoint};
pub use tracking::{Pose, TrackingFrame};
