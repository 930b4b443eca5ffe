use ::heapless::Vec;
use embassy_time::Duration;

use crate::leader::{LEADER_MAX_SEQUENCES, LeaderSequence};
use crate::send_string::{MacroSequence, SEND_STRING_MAX_NUM};
use crate::tap_dance::{TAP_DANCE_MAX_NUM, TapDance};

/// Config for configurable action behavior.
///
/// Everything here is fixed at build time.
#[derive(Clone, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
    pub one_shot: OneShotConfig,
    pub tap_dance: TapDancesConfig,
    pub leader: LeaderConfig,
    pub strings: StringsConfig,
    pub indicator: IndicatorConfig,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// A tap-hold key held longer than this is a hold
    pub hold_timeout: Duration,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            hold_timeout: Duration::from_millis(250),
        }
    }
}

/// Config for one shot behavior
#[derive(Clone, Copy, Debug)]
pub struct OneShotConfig {
    pub timeout: Duration,
}

impl Default for OneShotConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

/// Tap dance definitions, `KeyAction::TapDance(i)` refers to `tap_dances[i]`
#[derive(Clone, Debug, Default)]
pub struct TapDancesConfig {
    pub tap_dances: Vec<TapDance, TAP_DANCE_MAX_NUM>,
}

/// Config for the leader key
#[derive(Clone, Debug)]
pub struct LeaderConfig {
    /// Time after the leader key press in which the sequence must be typed
    pub timeout: Duration,
    /// Restart the timeout after each key of the sequence
    pub per_key_timing: bool,
    /// Sequences, the first fully matched one wins
    pub sequences: Vec<LeaderSequence, LEADER_MAX_SEQUENCES>,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(600),
            per_key_timing: false,
            sequences: Vec::new(),
        }
    }
}

/// Strings typed by `Action::SendString(i)`
#[derive(Clone, Debug, Default)]
pub struct StringsConfig {
    pub strings: Vec<MacroSequence, SEND_STRING_MAX_NUM>,
}

/// Config for the three indicator LEDs
#[derive(Clone, Copy, Debug)]
pub struct IndicatorConfig {
    /// Layer shown by LED 1 in layer mode
    pub function_layer: Option<u8>,
    /// Layer shown by LED 2 in layer mode
    pub numeric_layer: Option<u8>,
    /// Layer shown by LED 3 in layer mode
    pub mouse_layer: Option<u8>,
    /// While this layer is active, the LEDs show the host lock state instead of layers
    pub lock_layer: Option<u8>,
    /// Duty cycle of a lit LED, out of 255
    pub brightness: u8,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            function_layer: Some(1),
            numeric_layer: Some(3),
            mouse_layer: Some(2),
            lock_layer: Some(5),
            // Full brightness is far too bright
            brightness: 100,
        }
    }
}
