use crate::action::KeyAction;
use crate::error::PersonaError;
use crate::event::{KeyPos, KeyboardEvent};

/// Maximum number of layers, limited by the width of [`LayerState`]
pub const MAX_LAYER_NUM: usize = 32;

/// Active layers, as a bitmask over layer indices.
///
/// The base layer (layer 0) is always active: it's the fallback of every lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState(u32);

impl Default for LayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerState {
    pub const fn new() -> Self {
        Self(1)
    }

    /// Build a layer state from a raw mask, the base layer bit is always set
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits | 1)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_active(&self, layer: u8) -> bool {
        (layer as usize) < MAX_LAYER_NUM && self.0 & (1 << layer) != 0
    }

    /// Highest active layer
    pub fn highest(&self) -> u8 {
        (31 - self.0.leading_zeros()) as u8
    }

    fn set(&mut self, layer: u8, active: bool) {
        if layer == 0 || layer as usize >= MAX_LAYER_NUM {
            return;
        }
        if active {
            self.0 |= 1 << layer;
        } else {
            self.0 &= !(1 << layer);
        }
    }

    /// Deactivate all overlay layers
    pub fn clear(&mut self) {
        self.0 = 1;
    }
}

/// Keymap represents the stack of layers.
///
/// The conception of Keymap is borrowed from qmk: <https://docs.qmk.fm/#/keymap>.
/// Layers are immutable, only their activation (the [`LayerState`]) changes at runtime.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Layers
    layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// The layer each pressed key was resolved on, so that the release matches the press
    layer_cache: [[u8; COL]; ROW],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeyMap<'a, ROW, COL, NUM_LAYER> {
    pub fn new(layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER]) -> Result<Self, PersonaError> {
        if NUM_LAYER == 0 || NUM_LAYER > MAX_LAYER_NUM {
            return Err(PersonaError::InvalidLayerCount(NUM_LAYER));
        }
        for (row, keys) in layers[0].iter().enumerate() {
            for (col, action) in keys.iter().enumerate() {
                if *action == KeyAction::Transparent {
                    return Err(PersonaError::TransparentBaseLayer {
                        row: row as u8,
                        col: col as u8,
                    });
                }
            }
        }

        Ok(KeyMap {
            layers,
            layer_cache: [[0; COL]; ROW],
        })
    }

    pub fn layers(&self) -> &'a [[[KeyAction; COL]; ROW]; NUM_LAYER] {
        self.layers
    }

    /// All bindings referenced in the keymap
    pub(crate) fn actions(&self) -> impl Iterator<Item = &KeyAction> {
        self.layers.iter().flatten().flatten()
    }

    /// Resolve the binding at `pos`, searching active layers from the highest to the base layer.
    ///
    /// Returns the binding and the layer it was found on.
    pub fn resolve(&self, pos: KeyPos, state: &LayerState) -> (KeyAction, u8) {
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= ROW || col >= COL {
            warn!("Key position {:?} is out of the keymap", pos);
            return (KeyAction::No, 0);
        }

        for (layer_idx, layer) in self.layers.iter().enumerate().skip(1).rev() {
            if !state.is_active(layer_idx as u8) {
                continue;
            }
            let action = layer[row][col];
            if action != KeyAction::Transparent {
                return (action, layer_idx as u8);
            }
        }

        // The base layer has no transparent key
        (self.layers[0][row][col], 0)
    }

    /// Fetch the binding of a key event, with layer cache.
    ///
    /// A release always uses the layer its press was resolved on,
    /// even if the layer state changed in between.
    pub fn action_with_layer_cache(&mut self, event: KeyboardEvent, state: &LayerState) -> KeyAction {
        let (row, col) = (event.pos.row as usize, event.pos.col as usize);
        if row >= ROW || col >= COL {
            warn!("Key position {:?} is out of the keymap", event.pos);
            return KeyAction::No;
        }

        if !event.pressed {
            // Releasing a pressed key, use cached layer and restore the cache
            let layer = self.pop_layer_from_cache(row, col);
            return self.layers[layer as usize][row][col];
        }

        let (action, layer) = self.resolve(event.pos, state);
        self.save_layer_cache(row, col, layer);
        action
    }

    fn pop_layer_from_cache(&mut self, row: usize, col: usize) -> u8 {
        let layer = self.layer_cache[row][col];
        self.layer_cache[row][col] = 0;
        layer
    }

    fn save_layer_cache(&mut self, row: usize, col: usize, layer_num: u8) {
        self.layer_cache[row][col] = layer_num;
    }

    /// Activate given layer
    pub fn activate_layer(&self, state: &mut LayerState, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        state.set(layer_num, true);
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&self, state: &mut LayerState, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        state.set(layer_num, false);
    }

    /// Toggle given layer
    pub fn toggle_layer(&self, state: &mut LayerState, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        let active = state.is_active(layer_num);
        state.set(layer_num, !active);
    }
}
