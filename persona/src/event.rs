//! Events going in and out of the keyboard.

use crate::keycode::HidKeyCode;

/// Position of a key in the matrix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

/// Raw key event from the matrix scanner.
///
/// The timestamp is passed alongside the event to [`crate::keyboard::Keyboard::process_event`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pressed: bool,
    pub pos: KeyPos,
}

impl KeyboardEvent {
    pub fn key(row: u8, col: u8, pressed: bool) -> Self {
        Self {
            pressed,
            pos: KeyPos { row, col },
        }
    }
}

/// A synthesized key press or release, sent to the host
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostEvent {
    pub keycode: HidKeyCode,
    pub pressed: bool,
}

impl HostEvent {
    pub const fn press(keycode: HidKeyCode) -> Self {
        Self { keycode, pressed: true }
    }

    pub const fn release(keycode: HidKeyCode) -> Self {
        Self {
            keycode,
            pressed: false,
        }
    }
}
