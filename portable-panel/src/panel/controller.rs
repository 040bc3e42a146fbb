//! The panel interaction state machine.
//!
//! `PortablePanel` fuses gesture edges, continuous pose samples, physical
//! pickup and desktop toggling into one control loop. The engine layer calls
//! it in three places per frame:
//!
//! 1. [`PortablePanel::handle_gesture_edge`] for every discrete input edge,
//! 2. [`PortablePanel::early_update`] for VR tracking (carry, two-handed
//!    scaling, distance close, deferred one-hand attach),
//! 3. [`PortablePanel::late_update`] for desktop placement and VR constraints,
//!    after the head pose is final.
//!
//! Manipulation always wins over constraints: a constraint only moves the
//! panel while `grab_mode == GrabMode::None`.

use bevy::prelude::*;

use super::constraint::ConstraintOffset;
use super::gesture::{
    ChannelMask, GestureChannel, GestureKind, Handedness, grabbing_hand, holding_hand,
    is_opening_gesture,
};
use super::hooks::{DefaultHooks, NetworkAuthority, PanelHooks, PanelNotification};
use super::placement::{DesktopPlacement, carried_pose, facing_head, hand_offset};
use super::scale::{AvatarScale, ScaleLimits, current_spread, two_handed_scale};
use super::settings::{CloseBehavior, ConstraintMode, DesktopToggleMode, PanelSettings};
use super::state::{
    Carrier, ForceState, GrabMode, HandSide, PanelPhase, PanelState, RespawnPoint,
};
use super::tracking::TrackingFrame;

/// Everything a state machine call needs from the outside world.
pub struct PanelContext<'a> {
    pub panel: Entity,
    pub frame: &'a TrackingFrame,
    /// Seconds since startup.
    pub now: f32,
    pub authority: Option<&'a mut dyn NetworkAuthority>,
}

impl<'a> PanelContext<'a> {
    pub fn new(panel: Entity, frame: &'a TrackingFrame, now: f32) -> Self {
        Self {
            panel,
            frame,
            now,
            authority: None,
        }
    }

    pub fn with_authority(mut self, authority: &'a mut dyn NetworkAuthority) -> Self {
        self.authority = Some(authority);
        self
    }
}

/// Desktop toggle key state for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesktopToggleInput {
    pub held: bool,
    pub just_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseReason {
    /// Distance, toggle release or a small drop; the closing hook can veto it.
    Natural,
    /// Explicit close call; a veto only skips the deactivate / respawn step.
    Forced,
}

#[derive(Component)]
#[require(Transform, Visibility)]
pub struct PortablePanel {
    pub(crate) settings: PanelSettings,
    pub(crate) state: PanelState,
    pub(crate) hooks: Box<dyn PanelHooks + Send + Sync>,
    notifications: Vec<PanelNotification>,
    /// Last observed desktop toggle key state, used to latch force overrides.
    toggle_held: bool,
    started: bool,
}

impl Default for PortablePanel {
    fn default() -> Self {
        Self::new(PanelSettings::default())
    }
}

impl PortablePanel {
    pub fn new(settings: PanelSettings) -> Self {
        let state = PanelState {
            is_pickupable: settings.pickupable,
            constraint_mode: settings.constraint_mode,
            current_scale: 1.0,
            ..default()
        };
        Self {
            settings,
            state,
            hooks: Box::new(DefaultHooks),
            notifications: Vec::new(),
            toggle_held: false,
            started: false,
        }
    }

    pub fn with_hooks(mut self, hooks: impl PanelHooks + Send + Sync + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Swap in new settings while keeping runtime state.
    pub fn apply_settings(&mut self, settings: PanelSettings) {
        if settings.constraint_mode != self.settings.constraint_mode {
            self.state.constraint_mode = settings.constraint_mode;
            self.state.constraint_offset = None;
        }
        if settings.pickupable != self.settings.pickupable {
            self.state.is_pickupable = settings.pickupable;
        }
        if settings.close_behavior != self.settings.close_behavior
            && self.started
            && !self.state.is_open
        {
            self.state.is_active = settings.close_behavior == CloseBehavior::Respawn;
        }
        self.settings = settings;
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// First activation: capture the respawn baseline and settle into the closed state.
    pub fn start(&mut self, transform: &Transform) {
        if self.started {
            return;
        }
        self.started = true;
        self.state.respawn = Some(RespawnPoint::from_transform(transform));
        self.state.current_scale = transform.scale.x;
        self.state.is_open = false;
        self.state.is_active = self.settings.close_behavior == CloseBehavior::Respawn;
        self.hooks.on_start();
        debug!("Portable panel started at {:?}", transform.translation);
    }

    // Queries

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Whether the panel object should currently be shown.
    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn grab_mode(&self) -> GrabMode {
        self.state.grab_mode
    }

    pub fn phase(&self) -> PanelPhase {
        self.state.phase()
    }

    pub fn is_held_by_one_hand(&self) -> bool {
        matches!(self.state.grab_mode, GrabMode::OneHanded(_))
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked
    }

    pub fn is_pickupable(&self) -> bool {
        self.state.is_pickupable
    }

    /// Whether the physical pickup collaborator should accept grabs.
    pub fn pickup_allowed(&self) -> bool {
        self.state.is_pickupable && !self.state.is_locked
    }

    pub fn constraint_mode(&self) -> ConstraintMode {
        self.state.constraint_mode
    }

    pub fn force_state(&self) -> ForceState {
        self.state.force_state
    }

    pub fn current_scale(&self) -> f32 {
        self.state.current_scale
    }

    pub fn respawn_point(&self) -> Option<RespawnPoint> {
        self.state.respawn
    }

    pub fn drain_notifications(&mut self) -> std::vec::Drain<'_, PanelNotification> {
        self.notifications.drain(..)
    }

    // Public operations

    /// Open in front of the head, bypassing gestures. No-op when already open.
    pub fn force_open(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        if self.state.is_open {
            return;
        }
        self.latch_force(ForceState::ForceOpen);
        self.open_panel();
        self.ensure_ownership(ctx);
        self.place_on_desktop(ctx.frame, transform);
        self.recache_constraint(ctx.frame, transform);
    }

    /// Close, bypassing gestures. No-op when already closed.
    pub fn force_close(&mut self, transform: &mut Transform) {
        if !self.state.is_open {
            return;
        }
        self.latch_force(ForceState::ForceClosed);
        self.close_panel(CloseReason::Forced, transform);
    }

    pub fn toggle(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        if self.state.is_open {
            self.force_close(transform);
        } else {
            self.force_open(ctx, transform);
        }
    }

    /// Return to the respawn point, ending any manipulation. Does not change the open flag.
    pub fn respawn(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        let Some(point) = self.state.respawn else {
            return;
        };
        self.end_manipulation();
        self.state.is_locked = false;
        self.ensure_ownership(ctx);
        point.apply(transform);
        self.state.current_scale = point.scale;
        self.recache_constraint(ctx.frame, transform);
        info!("Panel respawned at {:?}", point.position);
    }

    pub fn set_respawn_point(&mut self, point: RespawnPoint) {
        self.state.respawn = Some(point);
    }

    /// Lock or unlock gesture manipulation. Locking drops a gesture-held panel
    /// in place and forgets the active gesture channels.
    pub fn set_locked(&mut self, locked: bool, frame: &TrackingFrame, transform: &Transform) {
        if self.state.is_locked == locked {
            return;
        }
        self.state.is_locked = locked;
        if !locked {
            return;
        }
        self.state.triggered.clear();
        self.state.attach_pending = false;
        if matches!(
            self.state.grab_mode,
            GrabMode::TwoHanded | GrabMode::OneHanded(Carrier::Hand(_))
        ) {
            self.end_manipulation();
            self.recache_constraint(frame, transform);
        }
    }

    pub fn set_pickupable(&mut self, pickupable: bool) {
        self.state.is_pickupable = pickupable;
    }

    pub fn toggle_pickupable(&mut self) {
        self.state.is_pickupable = !self.state.is_pickupable;
    }

    pub fn set_constraint_mode(
        &mut self,
        mode: ConstraintMode,
        frame: &TrackingFrame,
        transform: &Transform,
    ) {
        self.state.constraint_mode = mode;
        self.recache_constraint(frame, transform);
    }

    /// Show or hide the panel object directly, e.g. after a vetoed opening animation.
    pub fn set_active(&mut self, active: bool) {
        self.state.is_active = active;
    }

    // Gesture edges

    pub fn handle_gesture_edge(
        &mut self,
        ctx: &mut PanelContext,
        transform: &mut Transform,
        channel: GestureChannel,
        pressed: bool,
    ) {
        if !self.started || !ctx.frame.in_vr || self.state.is_locked {
            return;
        }
        if !self.state.triggered.set(channel, pressed, ctx.now) {
            return;
        }

        let (valid, carry) = self.channel_masks(ctx.frame);
        if !carry.contains(channel) {
            return;
        }

        match self.state.grab_mode {
            GrabMode::TwoHanded => self.two_handed_edge(ctx, transform, valid, carry),
            GrabMode::OneHanded(Carrier::Hand(hand)) => {
                self.one_handed_edge(ctx, transform, hand, valid, carry)
            }
            // The physics collaborator owns a picked-up panel.
            GrabMode::OneHanded(Carrier::Pickup) => {}
            GrabMode::None => {
                if pressed {
                    self.idle_edge(ctx, transform, valid);
                }
            }
        }
    }

    fn idle_edge(&mut self, ctx: &mut PanelContext, transform: &mut Transform, valid: ChannelMask) {
        if self.movement_gated(ctx.frame) {
            debug!("Gesture ignored while the player is moving");
            return;
        }

        let triggered = self.state.triggered;
        if is_opening_gesture(&triggered, valid, Some(self.settings.gesture_sync_window)) {
            if self.state.is_open {
                self.begin_two_handed(ctx, transform, false);
                return;
            }
            let spread = match Handedness::detect(ctx.frame.left_connected, ctx.frame.right_connected) {
                Handedness::TwoHanded => ctx
                    .frame
                    .left_hand
                    .position
                    .distance(ctx.frame.right_hand.position),
                _ => 0.0,
            };
            let threshold = self.avatar(ctx.frame).apply(self.settings.closing_hand_distance);
            if spread >= threshold {
                debug!("Hands {:.2}m apart, too far to open (limit {:.2}m)", spread, threshold);
                return;
            }
            self.begin_two_handed(ctx, transform, true);
        } else if self.state.is_open && self.state.is_pickupable {
            let grabs = ChannelMask::connected(
                GestureKind::Grab,
                ctx.frame.left_connected,
                ctx.frame.right_connected,
            );
            if let Some(hand) = grabbing_hand(&triggered, grabs) {
                self.attach_to_hand(ctx, transform, hand);
            }
        }
    }

    fn one_handed_edge(
        &mut self,
        ctx: &mut PanelContext,
        transform: &mut Transform,
        hand: HandSide,
        valid: ChannelMask,
        carry: ChannelMask,
    ) {
        let triggered = self.state.triggered;
        if is_opening_gesture(&triggered, valid, None) && !self.movement_gated(ctx.frame) {
            self.begin_two_handed(ctx, transform, false);
        } else if !triggered.any_in(carry) {
            self.drop_panel(ctx, transform);
        } else if !triggered.any_in(carry.on_hand(hand)) {
            // Carrying hand let go while the other one still holds.
            self.attach_to_hand(ctx, transform, hand.other());
        }
    }

    fn two_handed_edge(
        &mut self,
        ctx: &mut PanelContext,
        transform: &mut Transform,
        valid: ChannelMask,
        carry: ChannelMask,
    ) {
        let triggered = self.state.triggered;
        if is_opening_gesture(&triggered, valid, None) {
            // Re-engaged before the deferred attach fired.
            self.rebaseline_two_handed(ctx.frame, transform);
        } else if !triggered.any_in(carry) {
            self.drop_panel(ctx, transform);
        } else if !self.state.attach_pending {
            self.state.attach_pending = true;
            self.state.attach_due_at = ctx.now + self.settings.one_hand_attach_delay;
            debug!("One hand released, one-handed attach due at {:.2}s", self.state.attach_due_at);
        }
    }

    // Per-frame ticks

    /// Early pass: VR tracking and manipulation.
    pub fn early_update(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        if !self.started || !ctx.frame.in_vr {
            return;
        }

        self.deliver_pending_attach(ctx, transform);

        match self.state.grab_mode {
            GrabMode::None => {
                if !self.state.is_open {
                    return;
                }
                let limit = self
                    .avatar(ctx.frame)
                    .apply(self.settings.max_distance_before_closing);
                let distance = ctx.frame.head.position.distance(transform.translation);
                if distance > limit {
                    debug!("Panel {:.2}m from head, closing", distance);
                    self.close_panel(CloseReason::Natural, transform);
                }
            }
            GrabMode::OneHanded(Carrier::Hand(hand)) => {
                let (position, rotation) = carried_pose(
                    ctx.frame.hand(hand),
                    self.state.baseline.offset_position,
                    self.state.baseline.offset_rotation,
                );
                transform.translation = position;
                transform.rotation = rotation;
            }
            GrabMode::OneHanded(Carrier::Pickup) => {
                self.state.current_scale = transform.scale.x;
            }
            GrabMode::TwoHanded => self.update_two_handed(ctx.frame, transform),
        }
    }

    /// Late pass: desktop placement, or VR constraint following.
    pub fn late_update(
        &mut self,
        ctx: &mut PanelContext,
        transform: &mut Transform,
        toggle: DesktopToggleInput,
    ) {
        if !self.started {
            return;
        }
        if ctx.frame.in_vr {
            self.apply_constraint(ctx.frame, transform);
        } else {
            self.desktop_update(ctx, transform, toggle);
        }
    }

    fn deliver_pending_attach(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        if !self.state.attach_pending || ctx.now < self.state.attach_due_at {
            return;
        }
        self.state.attach_pending = false;

        if self.state.grab_mode != GrabMode::TwoHanded || !self.state.is_pickupable {
            return;
        }
        let (valid, carry) = self.channel_masks(ctx.frame);
        let triggered = self.state.triggered;
        if is_opening_gesture(&triggered, valid, None) {
            return;
        }
        if let Some(hand) = holding_hand(&triggered, carry) {
            self.attach_to_hand(ctx, transform, hand);
        }
    }

    fn update_two_handed(&mut self, frame: &TrackingFrame, transform: &mut Transform) {
        let handedness = Handedness::detect(frame.left_connected, frame.right_connected);
        let Some((spread, centre)) =
            current_spread(handedness, frame, self.state.baseline.one_handed_origin)
        else {
            return;
        };
        let scale = two_handed_scale(
            self.state.baseline.start_scale,
            self.state.baseline.start_hand_spread,
            spread,
            &self.limits(frame),
        );
        transform.translation = centre;
        transform.rotation = facing_head(centre, frame.head.position);
        self.set_scale(transform, scale);
    }

    fn desktop_update(
        &mut self,
        ctx: &mut PanelContext,
        transform: &mut Transform,
        toggle: DesktopToggleInput,
    ) {
        self.toggle_held = toggle.held;
        if self.state.force_state != ForceState::None {
            if toggle.held == self.state.force_latch_key_held {
                return;
            }
            debug!("Toggle key changed, releasing {:?}", self.state.force_state);
            self.state.force_state = ForceState::None;
        }

        match self.settings.desktop_toggle {
            DesktopToggleMode::TabOnHold => {
                if toggle.held {
                    if !self.state.is_open {
                        self.open_panel();
                        self.ensure_ownership(ctx);
                    }
                    self.place_on_desktop(ctx.frame, transform);
                } else if self.state.is_open {
                    self.close_panel(CloseReason::Natural, transform);
                }
            }
            DesktopToggleMode::Toggle => {
                if !toggle.just_pressed {
                    return;
                }
                if self.state.is_open {
                    self.close_panel(CloseReason::Natural, transform);
                } else {
                    self.open_panel();
                    self.ensure_ownership(ctx);
                    self.place_on_desktop(ctx.frame, transform);
                }
            }
        }
    }

    fn apply_constraint(&mut self, frame: &TrackingFrame, transform: &mut Transform) {
        let mode = self.state.constraint_mode;
        if !self.state.is_open || self.state.grab_mode.is_held() || mode == ConstraintMode::None {
            return;
        }
        let offset = match self.state.constraint_offset {
            Some(offset) if offset.mode() == mode => offset,
            _ => {
                let Some(offset) = ConstraintOffset::capture(mode, frame, transform) else {
                    return;
                };
                self.state.constraint_offset = Some(offset);
                offset
            }
        };
        offset.apply(frame, transform);
    }

    // Transitions

    pub(crate) fn open_panel(&mut self) {
        self.state.is_open = true;
        if self.hooks.on_panel_opening() {
            self.state.is_active = true;
        } else {
            debug!("Panel opening vetoed, activation skipped");
        }
        self.notify(PanelNotification::Opened);
        info!("Panel opened");
    }

    /// Returns false when a natural close was vetoed and the panel stays open.
    pub(crate) fn close_panel(&mut self, reason: CloseReason, transform: &mut Transform) -> bool {
        let accepted = self.hooks.on_panel_closing();
        if !accepted && reason == CloseReason::Natural {
            debug!("Panel closing vetoed, panel stays open");
            return false;
        }

        self.end_manipulation();
        self.state.is_open = false;
        self.state.is_locked = false;
        self.state.constraint_offset = None;

        if accepted {
            match self.settings.close_behavior {
                CloseBehavior::Deactivate => self.state.is_active = false,
                CloseBehavior::Respawn => {
                    if let Some(point) = self.state.respawn {
                        point.apply(transform);
                        self.state.current_scale = point.scale;
                    }
                }
            }
        } else {
            debug!("Forced close vetoed, {:?} skipped", self.settings.close_behavior);
        }

        self.notify(PanelNotification::Closed);
        info!("Panel closed ({:?})", reason);
        true
    }

    fn begin_two_handed(&mut self, ctx: &mut PanelContext, transform: &mut Transform, from_closed: bool) {
        let handedness = Handedness::detect(ctx.frame.left_connected, ctx.frame.right_connected);
        let origin = match handedness {
            Handedness::OneController(side) => ctx.frame.hand(side).position,
            _ => transform.translation,
        };
        let Some((spread, _)) = current_spread(handedness, ctx.frame, origin) else {
            return;
        };

        if from_closed {
            self.open_panel();
            // Opening scale is the hand spread itself.
            self.state.baseline.start_scale = spread;
        } else {
            self.state.baseline.start_scale = transform.scale.x;
        }
        self.state.baseline.one_handed_origin = origin;
        self.state.baseline.start_hand_spread = spread;
        self.state.grab_mode = GrabMode::TwoHanded;

        self.ensure_ownership(ctx);
        self.hooks.on_panel_grab();
        self.notify(PanelNotification::Grabbed);
        debug!("Two-handed grab, spread {:.3}m", spread);

        // Take the opening pose now so a release before the next tick sees it.
        if from_closed {
            self.update_two_handed(ctx.frame, transform);
        }
    }

    fn rebaseline_two_handed(&mut self, frame: &TrackingFrame, transform: &Transform) {
        let handedness = Handedness::detect(frame.left_connected, frame.right_connected);
        if let Some((spread, _)) =
            current_spread(handedness, frame, self.state.baseline.one_handed_origin)
        {
            self.state.baseline.start_hand_spread = spread;
            self.state.baseline.start_scale = transform.scale.x;
        }
    }

    fn attach_to_hand(&mut self, ctx: &mut PanelContext, transform: &Transform, hand: HandSide) {
        let (offset_position, offset_rotation) = hand_offset(ctx.frame.hand(hand), transform);
        self.state.baseline.offset_position = offset_position;
        self.state.baseline.offset_rotation = offset_rotation;
        self.state.baseline.start_scale = transform.scale.x;
        self.state.grab_mode = GrabMode::OneHanded(Carrier::Hand(hand));

        self.ensure_ownership(ctx);
        self.hooks.on_panel_grab();
        self.notify(PanelNotification::Grabbed);
        debug!("Panel attached to {:?} hand", hand);
    }

    fn drop_panel(&mut self, ctx: &mut PanelContext, transform: &mut Transform) {
        self.end_manipulation();

        let threshold = self.avatar(ctx.frame).apply(self.settings.closing_hand_distance);
        if self.state.is_open && transform.scale.x < threshold {
            debug!("Dropped at scale {:.3} below {:.3}", transform.scale.x, threshold);
            self.close_panel(CloseReason::Natural, transform);
        }
        if self.state.is_open {
            self.recache_constraint(ctx.frame, transform);
        }
    }

    /// Leave any grab mode, firing the drop callback if something was held.
    pub(crate) fn end_manipulation(&mut self) {
        if !self.state.grab_mode.is_held() {
            return;
        }
        self.state.grab_mode = GrabMode::None;
        self.state.attach_pending = false;
        self.hooks.on_panel_drop();
        self.notify(PanelNotification::Dropped);
        debug!("Panel dropped");
    }

    // Helpers

    fn place_on_desktop(&mut self, frame: &TrackingFrame, transform: &mut Transform) {
        let placement = DesktopPlacement::new(&self.settings, self.avatar(frame));
        let old_scale = transform.scale.x;
        placement.apply(frame.head, transform);
        transform.scale = Vec3::splat(old_scale);
        self.set_scale(transform, placement.scale);
    }

    fn set_scale(&mut self, transform: &mut Transform, scale: f32) {
        let old_scale = transform.scale.x;
        transform.scale = Vec3::splat(scale);
        self.state.current_scale = scale;
        if (old_scale - scale).abs() > f32::EPSILON {
            self.hooks.on_panel_scaled(old_scale, scale);
            self.notify(PanelNotification::Scaled {
                old_scale,
                new_scale: scale,
            });
        }
    }

    pub(crate) fn recache_constraint(&mut self, frame: &TrackingFrame, transform: &Transform) {
        self.state.constraint_offset =
            ConstraintOffset::capture(self.state.constraint_mode, frame, transform);
    }

    fn latch_force(&mut self, force: ForceState) {
        self.state.force_state = force;
        self.state.force_latch_key_held = self.toggle_held;
    }

    pub(crate) fn ensure_ownership(&self, ctx: &mut PanelContext) {
        if !self.settings.set_owner_on_pickup {
            return;
        }
        let Some(authority) = ctx.authority.as_deref_mut() else {
            return;
        };
        if !authority.is_owner(ctx.panel) {
            let local = authority.local_participant();
            authority.set_owner(local, ctx.panel);
            debug!("Requested ownership of panel {:?} for {:?}", ctx.panel, local);
        }
    }

    fn channel_masks(&self, frame: &TrackingFrame) -> (ChannelMask, ChannelMask) {
        let valid = ChannelMask::valid_channels(
            self.settings.gesture_mode,
            frame.left_connected,
            frame.right_connected,
        );
        let grabs = ChannelMask::connected(GestureKind::Grab, frame.left_connected, frame.right_connected);
        (valid, valid.union(grabs))
    }

    fn movement_gated(&self, frame: &TrackingFrame) -> bool {
        self.settings.require_stopped && frame.player_speed() > self.settings.stopped_speed_threshold
    }

    fn avatar(&self, frame: &TrackingFrame) -> AvatarScale {
        AvatarScale::for_frame(frame, &self.settings)
    }

    fn limits(&self, frame: &TrackingFrame) -> ScaleLimits {
        ScaleLimits::new(&self.settings, self.avatar(frame))
    }

    pub(crate) fn notify(&mut self, notification: PanelNotification) {
        self.notifications.push(notification);
    }
}
