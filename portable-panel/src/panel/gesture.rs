//! Gesture channel bookkeeping and opening-gesture recognition.
//!
//! Every hand reports up to two boolean channels, grab and trigger. Which of
//! them count towards the opening gesture depends on the configured
//! [`GestureMode`] and on which controllers are currently connected; with a
//! single controller the gesture relaxes to that hand alone.

use super::settings::GestureMode;
use super::state::HandSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Grab,
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureChannel {
    GrabLeft,
    GrabRight,
    TriggerLeft,
    TriggerRight,
}

impl GestureChannel {
    pub const ALL: [GestureChannel; 4] = [
        GestureChannel::GrabLeft,
        GestureChannel::GrabRight,
        GestureChannel::TriggerLeft,
        GestureChannel::TriggerRight,
    ];

    pub fn new(kind: GestureKind, hand: HandSide) -> Self {
        match (kind, hand) {
            (GestureKind::Grab, HandSide::Left) => GestureChannel::GrabLeft,
            (GestureKind::Grab, HandSide::Right) => GestureChannel::GrabRight,
            (GestureKind::Trigger, HandSide::Left) => GestureChannel::TriggerLeft,
            (GestureKind::Trigger, HandSide::Right) => GestureChannel::TriggerRight,
        }
    }

    pub fn hand(self) -> HandSide {
        match self {
            GestureChannel::GrabLeft | GestureChannel::TriggerLeft => HandSide::Left,
            GestureChannel::GrabRight | GestureChannel::TriggerRight => HandSide::Right,
        }
    }

    fn index(self) -> usize {
        match self {
            GestureChannel::GrabLeft => 0,
            GestureChannel::GrabRight => 1,
            GestureChannel::TriggerLeft => 2,
            GestureChannel::TriggerRight => 3,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// A subset of the four gesture channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const EMPTY: Self = Self(0);

    pub fn from_channels(channels: &[GestureChannel]) -> Self {
        Self(channels.iter().fold(0, |bits, ch| bits | ch.bit()))
    }

    /// Channels selected by the gesture mode on currently connected controllers.
    pub fn valid_channels(mode: GestureMode, left_connected: bool, right_connected: bool) -> Self {
        let kinds: &[GestureKind] = match mode {
            GestureMode::Grab => &[GestureKind::Grab],
            GestureMode::Trigger => &[GestureKind::Trigger],
            GestureMode::Both => &[GestureKind::Grab, GestureKind::Trigger],
        };
        kinds.iter().fold(Self::EMPTY, |mask, kind| {
            mask.union(Self::connected(*kind, left_connected, right_connected))
        })
    }

    /// Channels of one kind on currently connected controllers.
    pub fn connected(kind: GestureKind, left_connected: bool, right_connected: bool) -> Self {
        let mut mask = Self::EMPTY;
        if left_connected {
            mask.0 |= GestureChannel::new(kind, HandSide::Left).bit();
        }
        if right_connected {
            mask.0 |= GestureChannel::new(kind, HandSide::Right).bit();
        }
        mask
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, channel: GestureChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = GestureChannel> {
        GestureChannel::ALL
            .into_iter()
            .filter(move |ch| self.contains(*ch))
    }

    pub fn on_hand(self, hand: HandSide) -> Self {
        Self(
            self.iter()
                .filter(|ch| ch.hand() == hand)
                .fold(0, |bits, ch| bits | ch.bit()),
        )
    }
}

/// How many hands the current device setup can gesture with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    TwoHanded,
    /// Only one controller is connected; spread is measured against a
    /// virtual hand mirrored at the grab origin.
    OneController(HandSide),
    NoController,
}

impl Handedness {
    pub fn detect(left_connected: bool, right_connected: bool) -> Self {
        match (left_connected, right_connected) {
            (true, true) => Handedness::TwoHanded,
            (true, false) => Handedness::OneController(HandSide::Left),
            (false, true) => Handedness::OneController(HandSide::Right),
            (false, false) => Handedness::NoController,
        }
    }
}

/// Currently active gesture channels and when each became active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TriggeredInputs {
    active: ChannelMask,
    activated_at: [f32; 4],
}

impl TriggeredInputs {
    /// Record an edge. Returns false when the channel was already in that state.
    pub fn set(&mut self, channel: GestureChannel, pressed: bool, now: f32) -> bool {
        if self.contains(channel) == pressed {
            return false;
        }
        if pressed {
            self.active.0 |= channel.bit();
            self.activated_at[channel.index()] = now;
        } else {
            self.active.0 &= !channel.bit();
        }
        true
    }

    pub fn contains(&self, channel: GestureChannel) -> bool {
        self.active.contains(channel)
    }

    pub fn clear(&mut self) {
        self.active = ChannelMask::EMPTY;
    }

    /// Whether any channel of `mask` is active.
    pub fn any_in(&self, mask: ChannelMask) -> bool {
        self.active.0 & mask.0 != 0
    }

    /// Whether every channel of a non-empty `mask` is active.
    pub fn all_in(&self, mask: ChannelMask) -> bool {
        !mask.is_empty() && self.active.0 & mask.0 == mask.0
    }

    /// Activation timestamps bounding the active channels of `mask`.
    pub fn window(&self, mask: ChannelMask) -> Option<(f32, f32)> {
        mask.iter()
            .filter(|ch| self.contains(*ch))
            .map(|ch| self.activated_at[ch.index()])
            .fold(None, |bounds, t| match bounds {
                None => Some((t, t)),
                Some((start, end)) => Some((start.min(t), end.max(t))),
            })
    }
}

/// All valid channels held, optionally required to have started within `sync_window` seconds.
pub fn is_opening_gesture(
    triggered: &TriggeredInputs,
    valid: ChannelMask,
    sync_window: Option<f32>,
) -> bool {
    if !triggered.all_in(valid) {
        return false;
    }
    match (sync_window, triggered.window(valid)) {
        (Some(window), Some((start, end))) => end - start <= window,
        _ => true,
    }
}

/// Grab-only check: the first hand with an active grab channel in `grab_channels`.
pub fn grabbing_hand(triggered: &TriggeredInputs, grab_channels: ChannelMask) -> Option<HandSide> {
    HandSide::BOTH.into_iter().find(|hand| {
        let channel = GestureChannel::new(GestureKind::Grab, *hand);
        grab_channels.contains(channel) && triggered.contains(channel)
    })
}

/// The single hand still holding any channel of `mask`, if exactly one does.
pub fn holding_hand(triggered: &TriggeredInputs, mask: ChannelMask) -> Option<HandSide> {
    let left = triggered.any_in(mask.on_hand(HandSide::Left));
    let right = triggered.any_in(mask.on_hand(HandSide::Right));
    match (left, right) {
        (true, false) => Some(HandSide::Left),
        (false, true) => Some(HandSide::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(inputs: &mut TriggeredInputs, channels: &[(GestureChannel, f32)]) {
        for (ch, t) in channels {
            inputs.set(*ch, true, *t);
        }
    }

    #[test]
    fn valid_channels_follow_mode_and_connection() {
        let grab = ChannelMask::valid_channels(GestureMode::Grab, true, true);
        assert_eq!(
            grab,
            ChannelMask::from_channels(&[GestureChannel::GrabLeft, GestureChannel::GrabRight])
        );

        let both_right_only = ChannelMask::valid_channels(GestureMode::Both, false, true);
        assert_eq!(
            both_right_only,
            ChannelMask::from_channels(&[GestureChannel::GrabRight, GestureChannel::TriggerRight])
        );

        assert!(ChannelMask::valid_channels(GestureMode::Trigger, false, false).is_empty());
    }

    #[test]
    fn opening_requires_every_valid_channel() {
        let valid = ChannelMask::valid_channels(GestureMode::Both, true, true);
        let mut inputs = TriggeredInputs::default();
        press(
            &mut inputs,
            &[
                (GestureChannel::GrabLeft, 0.0),
                (GestureChannel::GrabRight, 0.0),
                (GestureChannel::TriggerLeft, 0.05),
            ],
        );
        assert!(!is_opening_gesture(&inputs, valid, None));

        inputs.set(GestureChannel::TriggerRight, true, 0.1);
        assert!(is_opening_gesture(&inputs, valid, Some(0.25)));
    }

    #[test]
    fn opening_rejects_unsynchronised_hands() {
        let valid = ChannelMask::valid_channels(GestureMode::Grab, true, true);
        let mut inputs = TriggeredInputs::default();
        press(
            &mut inputs,
            &[(GestureChannel::GrabLeft, 1.0), (GestureChannel::GrabRight, 1.4)],
        );
        assert!(!is_opening_gesture(&inputs, valid, Some(0.25)));
        // Already-held panels skip the window.
        assert!(is_opening_gesture(&inputs, valid, None));
    }

    #[test]
    fn single_controller_opens_with_one_hand() {
        let valid = ChannelMask::valid_channels(GestureMode::Trigger, true, false);
        let mut inputs = TriggeredInputs::default();
        press(&mut inputs, &[(GestureChannel::TriggerLeft, 3.0)]);
        assert!(is_opening_gesture(&inputs, valid, Some(0.25)));
    }

    #[test]
    fn empty_valid_set_never_opens() {
        let mut inputs = TriggeredInputs::default();
        press(&mut inputs, &[(GestureChannel::GrabLeft, 0.0)]);
        assert!(!is_opening_gesture(&inputs, ChannelMask::EMPTY, None));
    }

    #[test]
    fn repeated_edges_do_not_reset_activation_time() {
        let mut inputs = TriggeredInputs::default();
        assert!(inputs.set(GestureChannel::GrabLeft, true, 1.0));
        assert!(!inputs.set(GestureChannel::GrabLeft, true, 5.0));
        let mask = ChannelMask::from_channels(&[GestureChannel::GrabLeft]);
        assert_eq!(inputs.window(mask), Some((1.0, 1.0)));
    }

    #[test]
    fn grab_check_ignores_trigger_channels() {
        let grabs = ChannelMask::connected(GestureKind::Grab, true, true);
        let mut inputs = TriggeredInputs::default();
        press(&mut inputs, &[(GestureChannel::TriggerLeft, 0.0)]);
        assert_eq!(grabbing_hand(&inputs, grabs), None);

        press(&mut inputs, &[(GestureChannel::GrabRight, 0.0)]);
        assert_eq!(grabbing_hand(&inputs, grabs), Some(HandSide::Right));
    }

    #[test]
    fn holding_hand_requires_exactly_one_hand() {
        let mask = ChannelMask::valid_channels(GestureMode::Grab, true, true);
        let mut inputs = TriggeredInputs::default();
        press(
            &mut inputs,
            &[(GestureChannel::GrabLeft, 0.0), (GestureChannel::GrabRight, 0.0)],
        );
        assert_eq!(holding_hand(&inputs, mask), None);

        inputs.set(GestureChannel::GrabLeft, false, 0.5);
        assert_eq!(holding_hand(&inputs, mask), Some(HandSide::Right));

        inputs.set(GestureChannel::GrabRight, false, 0.6);
        assert_eq!(holding_hand(&inputs, mask), None);
    }
}
