use keymap_types::action::{EncoderAction, KeyAction};
use keymap_types::layer::LayerState;
use log::warn;

use crate::event::{Direction, KeyEvent, RotaryEncoderEvent};

/// Keymap represents the stack of layers.
///
/// The conception of Keymap is borrowed from qmk: <https://docs.qmk.fm/#/keymap>.
///
/// Keymap should be binded to the actual pcb matrix definition.
/// The keyboard uses tuple `(layer, row, col)` to retrieve the action from Keymap.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize = 0> {
    /// Layers
    layers: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Rotary encoders, each rotary encoder is represented as (Clockwise, CounterClockwise)
    encoders: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    /// Current state of each layer
    layer_state: LayerState,
    /// Default layer number, max: 32
    default_layer: u8,
    /// Layer cache
    layer_cache: [[u8; COL]; ROW],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(
        action_map: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
        encoder_map: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    ) -> Self {
        KeyMap {
            layers: action_map,
            encoders: encoder_map,
            layer_state: LayerState::new(),
            default_layer: 0,
            layer_cache: [[0; COL]; ROW],
        }
    }

    /// Get the default layer number
    pub fn get_default_layer(&self) -> u8 {
        self.default_layer
    }

    /// Set the default layer number
    pub fn set_default_layer(&mut self, layer_num: u8) {
        if !self.is_valid_layer(layer_num) {
            return;
        }
        self.default_layer = layer_num;
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    /// Fetch the action in keymap, with layer cache
    pub fn get_action_with_layer_cache(&mut self, key_event: KeyEvent) -> KeyAction {
        let row = key_event.row as usize;
        let col = key_event.col as usize;
        if row >= ROW || col >= COL {
            warn!("Key position ({}, {}) is out of the {}x{} matrix", row, col, ROW, COL);
            return KeyAction::No;
        }

        if !key_event.pressed {
            // Releasing a pressed key, use cached layer and restore the cache
            let layer = self.pop_layer_from_cache(row, col);
            return self.layers[layer as usize][row][col];
        }

        match self.resolve_layer(|layer| self.layers[layer][row][col].is_transparent()) {
            Some(layer_idx) => {
                // Found a valid action in the layer, cache it
                self.save_layer_cache(row, col, layer_idx);
                self.layers[layer_idx as usize][row][col]
            }
            None => KeyAction::No,
        }
    }

    /// Fetch the action of one encoder step, transparent entries fall through like keys do
    pub fn get_encoder_action(&self, encoder_event: RotaryEncoderEvent) -> KeyAction {
        let Some(encoders) = &self.encoders else {
            return KeyAction::No;
        };
        let id = encoder_event.id as usize;
        if id >= NUM_ENCODER {
            warn!("Encoder {} is not defined, keyboard has {} encoders", id, NUM_ENCODER);
            return KeyAction::No;
        }

        let pick = |encoder: &EncoderAction| match encoder_event.direction {
            Direction::Clockwise => encoder.clockwise(),
            Direction::CounterClockwise => encoder.counter_clockwise(),
        };
        match self.resolve_layer(|layer| pick(&encoders[layer][id]).is_transparent()) {
            Some(layer_idx) => pick(&encoders[layer_idx as usize][id]),
            None => KeyAction::No,
        }
    }

    /// Iterate from higher layer to lower layer, the lowest checked layer is the default layer.
    /// Returns the first active layer for which `skip` is false.
    fn resolve_layer(&self, skip: impl Fn(usize) -> bool) -> Option<u8> {
        for layer_idx in (0..NUM_LAYER as u8).rev() {
            if (self.layer_state.is_on(layer_idx) || layer_idx == self.default_layer) && !skip(layer_idx as usize) {
                return Some(layer_idx);
            }

            if layer_idx == self.default_layer {
                break;
            }
        }
        None
    }

    /// Layer number sent in the layer status report
    pub fn highest_layer(&self) -> u8 {
        self.layer_state.highest(self.default_layer)
    }

    fn pop_layer_from_cache(&mut self, row: usize, col: usize) -> u8 {
        let layer = self.layer_cache[row][col];
        self.layer_cache[row][col] = self.default_layer;

        layer
    }

    fn save_layer_cache(&mut self, row: usize, col: usize, layer_num: u8) {
        self.layer_cache[row][col] = layer_num;
    }

    fn is_valid_layer(&self, layer_num: u8) -> bool {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return false;
        }
        true
    }

    /// Activate given layer
    pub fn activate_layer(&mut self, layer_num: u8) {
        if self.is_valid_layer(layer_num) {
            self.layer_state.on(layer_num);
        }
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&mut self, layer_num: u8) {
        if self.is_valid_layer(layer_num) {
            self.layer_state.off(layer_num);
        }
    }

    /// Toggle given layer
    pub fn toggle_layer(&mut self, layer_num: u8) {
        if self.is_valid_layer(layer_num) {
            self.layer_state.toggle(layer_num);
        }
    }

    /// Activate given layer and deactivate all others, `layer_move` in QMK
    pub fn move_to_layer(&mut self, layer_num: u8) {
        if self.is_valid_layer(layer_num) {
            self.layer_state.move_to(layer_num);
        }
    }
}
