use core::ops::{BitAnd, BitOr, Not};

use bitfield_struct::bitfield;

use crate::keycode::HidKeyCode;

/// To represent all combinations of modifiers, at least 5 bits are needed.
/// 1 bit for Left/Right, 4 bits for modifier type. Represented in LSB format.
///
/// | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- |
/// | L/R | GUI | ALT |SHIFT| CTRL|
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct ModifierCombination {
    #[bits(1)]
    pub ctrl: bool,
    #[bits(1)]
    pub shift: bool,
    #[bits(1)]
    pub alt: bool,
    #[bits(1)]
    pub gui: bool,
    #[bits(1)]
    pub right: bool,
    #[bits(3)]
    _reserved: u8,
}

impl BitOr for ModifierCombination {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl ModifierCombination {
    pub const LCTRL: Self = Self::new().with_ctrl(true);
    pub const LSHIFT: Self = Self::new().with_shift(true);
    pub const LALT: Self = Self::new().with_alt(true);
    pub const LGUI: Self = Self::new().with_gui(true);
    pub const RCTRL: Self = Self::LCTRL.with_right(true);
    pub const RSHIFT: Self = Self::LSHIFT.with_right(true);
    pub const RALT: Self = Self::LALT.with_right(true);
    pub const RGUI: Self = Self::LGUI.with_right(true);
    /// Ctrl + Shift + Alt
    pub const MEH: Self = Self::new().with_ctrl(true).with_shift(true).with_alt(true);
    /// Ctrl + Shift + Alt + Gui
    pub const HYPER: Self = Self::MEH.with_gui(true);

    pub const fn new_from(right: bool, gui: bool, alt: bool, shift: bool, ctrl: bool) -> Self {
        ModifierCombination::new()
            .with_right(right)
            .with_gui(gui)
            .with_alt(alt)
            .with_shift(shift)
            .with_ctrl(ctrl)
    }

    /// Get modifier hid report bits from modifier combination
    pub fn to_hid_modifiers(self) -> HidModifiers {
        if !self.right() {
            HidModifiers::new()
                .with_left_ctrl(self.ctrl())
                .with_left_shift(self.shift())
                .with_left_alt(self.alt())
                .with_left_gui(self.gui())
        } else {
            HidModifiers::new()
                .with_right_ctrl(self.ctrl())
                .with_right_shift(self.shift())
                .with_right_alt(self.alt())
                .with_right_gui(self.gui())
        }
    }

    /// Modifier keycodes of this combination, in ctrl, shift, alt, gui order.
    ///
    /// Returns the keycodes and the number of valid entries.
    pub fn to_modifier_keycodes(self) -> ([HidKeyCode; 4], usize) {
        let (ctrl, shift, alt, gui) = if self.right() {
            (HidKeyCode::RCtrl, HidKeyCode::RShift, HidKeyCode::RAlt, HidKeyCode::RGui)
        } else {
            (HidKeyCode::LCtrl, HidKeyCode::LShift, HidKeyCode::LAlt, HidKeyCode::LGui)
        };
        let mut keycodes = [HidKeyCode::No; 4];
        let mut n = 0;
        for (enabled, keycode) in [(self.ctrl(), ctrl), (self.shift(), shift), (self.alt(), alt), (self.gui(), gui)] {
            if enabled {
                keycodes[n] = keycode;
                n += 1;
            }
        }
        (keycodes, n)
    }
}

/// Modifier byte of the HID keyboard report
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct HidModifiers {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl BitOr for HidModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl BitAnd for HidModifiers {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() & rhs.into_bits())
    }
}

impl Not for HidModifiers {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.into_bits())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_modifier_keycodes() {
        let (keycodes, n) = ModifierCombination::MEH.to_modifier_keycodes();
        assert_eq!(n, 3);
        assert_eq!(&keycodes[..n], &[HidKeyCode::LCtrl, HidKeyCode::LShift, HidKeyCode::LAlt]);

        let (keycodes, n) = ModifierCombination::RALT.to_modifier_keycodes();
        assert_eq!(&keycodes[..n], &[HidKeyCode::RAlt]);

        let (_, n) = ModifierCombination::new().to_modifier_keycodes();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_to_hid_modifiers() {
        assert_eq!(ModifierCombination::LSHIFT.to_hid_modifiers().into_bits(), 0b0000_0010);
        assert_eq!(ModifierCombination::RCTRL.to_hid_modifiers().into_bits(), 0b0001_0000);
        assert_eq!(ModifierCombination::HYPER.to_hid_modifiers().into_bits(), 0b0000_1111);
    }
}
