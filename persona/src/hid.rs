//! Fold host key events into HID keyboard reports.

use usbd_hid::descriptor::KeyboardReport;

use crate::event::HostEvent;
use crate::keycode::HidKeyCode;
use crate::led_indicator::LedIndicator;
use crate::modifier::HidModifiers;

/// Number of non-modifier keys in a boot keyboard report
pub const KEYBOARD_REPORT_KEYS: usize = 6;

/// Keeps the state of the keys sent to the host
#[derive(Debug)]
pub struct HidReporter {
    modifiers: HidModifiers,
    held_keycodes: [HidKeyCode; KEYBOARD_REPORT_KEYS],
    leds: LedIndicator,
}

impl Default for HidReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HidReporter {
    pub fn new() -> Self {
        Self {
            modifiers: HidModifiers::new(),
            held_keycodes: [HidKeyCode::No; KEYBOARD_REPORT_KEYS],
            leds: LedIndicator::new(),
        }
    }

    /// Lock state reported by the host, carried in the following reports
    pub fn set_leds(&mut self, leds: LedIndicator) {
        self.leds = leds;
    }

    /// Apply a key event, returns `true` if the report changed
    pub fn apply(&mut self, event: HostEvent) -> bool {
        let before = (self.modifiers, self.held_keycodes);
        let key = event.keycode;
        if key.is_modifier() {
            if event.pressed {
                self.modifiers = self.modifiers | key.to_hid_modifiers();
            } else {
                self.modifiers = self.modifiers & !key.to_hid_modifiers();
            }
        } else if key != HidKeyCode::No {
            if event.pressed {
                self.register_keycode(key);
            } else {
                self.unregister_keycode(key);
            }
        }
        before != (self.modifiers, self.held_keycodes)
    }

    fn register_keycode(&mut self, key: HidKeyCode) {
        if self.held_keycodes.contains(&key) {
            return;
        }
        // Find the first free slot
        match self.held_keycodes.iter().position(|&k| k == HidKeyCode::No) {
            Some(index) => self.held_keycodes[index] = key,
            None => warn!("More than {} keys pressed, {:?} is dropped", KEYBOARD_REPORT_KEYS, key),
        }
    }

    fn unregister_keycode(&mut self, key: HidKeyCode) {
        if let Some(index) = self.held_keycodes.iter().position(|&k| k == key) {
            self.held_keycodes[index] = HidKeyCode::No;
        }
    }

    pub fn report(&self) -> KeyboardReport {
        KeyboardReport {
            modifier: self.modifiers.into_bits(),
            reserved: 0,
            leds: self.leds.into_bits(),
            keycodes: self.held_keycodes.map(|k| k as u8),
        }
    }
}
