use core::fmt;

/// Errors reported while building the keymap or the keyboard.
///
/// Everything after construction falls back silently, so these are the only faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersonaError {
    /// Layer 0 has a transparent binding at (row, col)
    TransparentBaseLayer { row: u8, col: u8 },
    /// The keymap has no layer, or more layers than the layer mask can hold
    InvalidLayerCount(usize),
    /// A binding references a tap dance that isn't defined
    TapDanceOutOfRange { index: u8, defined: usize },
}

impl fmt::Display for PersonaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaError::TransparentBaseLayer { row, col } => {
                write!(f, "transparent key on the base layer at ({}, {})", row, col)
            }
            PersonaError::InvalidLayerCount(n) => write!(f, "invalid number of layers: {}", n),
            PersonaError::TapDanceOutOfRange { index, defined } => {
                write!(f, "tap dance {} is not defined, only {} tap dances available", index, defined)
            }
        }
    }
}

impl core::error::Error for PersonaError {}
