//! Key bindings and actions.
//!
//! Key types:
//! - [`KeyAction`] - What a key position is bound to on one layer
//! - [`Action`] - Single operations that the keyboard sends or executes
//! - [`DynamicMacroAction`] - Record/stop/play commands of the dynamic macro recorder

use crate::keycode::HidKeyCode;
use crate::modifier::ModifierCombination;

/// A KeyAction is the binding at a keyboard position, stored in keymap.
/// It can be a single action like triggering a key, or a composite keyboard action like tap/hold
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Blocking binding: does nothing, and stops the fallthrough to lower layers.
    No,
    /// Transparent binding, the next lower active layer will be checked.
    Transparent,
    /// A single action, triggered when pressed and cancelled when released.
    Single(Action),
    /// Applies to the next key press only, then clears itself.
    /// Used with `Action::Modifier` (one-shot modifier) and `Action::LayerOn` (one-shot layer).
    OneShot(Action),
    /// General tap/hold action: (tap_action, hold_action)
    TapHold(Action, Action),
    /// Tap dance action, references a tap dance definition by index.
    TapDance(u8),
}

impl KeyAction {
    /// The keycode this binding types when tapped, if any.
    ///
    /// Used by the leader key to buffer keys: tap/hold keys contribute their tap keycode.
    pub fn tap_keycode(&self) -> Option<HidKeyCode> {
        match self {
            KeyAction::Single(a) | KeyAction::TapHold(a, _) => a.keycode(),
            _ => None,
        }
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// No action
    No,
    /// A normal key stroke
    Key(HidKeyCode),
    /// Modifier combination, pressed together
    Modifier(ModifierCombination),
    /// Key stroke with modifier combination triggered, such as `Ctrl+Insert`
    KeyWithModifier(HidKeyCode, ModifierCombination),
    /// Activate a layer while the key is held
    LayerOn(u8),
    /// Toggle a layer when the key is released
    LayerToggle(u8),
    /// Deactivate all overlay layers, then activate the given one
    LayerToggleOnly(u8),
    /// Start a leader sequence, or end the active one
    Leader,
    /// Type the string at the given index of the string table
    SendString(u8),
    /// Control the dynamic macro recorder
    DynamicMacro(DynamicMacroAction),
}

impl Action {
    /// The keycode typed by this action, if it types one.
    pub fn keycode(&self) -> Option<HidKeyCode> {
        match self {
            Action::Key(k) | Action::KeyWithModifier(k, _) => Some(*k),
            _ => None,
        }
    }
}

/// Commands of the dynamic macro recorder
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DynamicMacroAction {
    /// Clear the slot and start recording into it
    RecordStart(MacroSlot),
    /// Stop the ongoing recording, whatever its slot
    RecordStop,
    /// Replay the slot
    Play(MacroSlot),
}

/// The two dynamic macro slots, which share one event buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroSlot {
    First,
    Second,
}

impl MacroSlot {
    pub const fn index(self) -> usize {
        match self {
            MacroSlot::First => 0,
            MacroSlot::Second => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            MacroSlot::First => MacroSlot::Second,
            MacroSlot::Second => MacroSlot::First,
        }
    }
}
