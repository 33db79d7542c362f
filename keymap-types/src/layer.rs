//! Active layer bit set, the equivalent of QMK's `layer_state_t`.

/// Bit `n` set means layer `n` is active. Supports up to 32 layers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState(u32);

pub const MAX_LAYERS: u8 = 32;

impl LayerState {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_on(self, layer: u8) -> bool {
        layer < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    pub fn on(&mut self, layer: u8) {
        if layer < MAX_LAYERS {
            self.0 |= 1 << layer;
        }
    }

    pub fn off(&mut self, layer: u8) {
        if layer < MAX_LAYERS {
            self.0 &= !(1 << layer);
        }
    }

    pub fn toggle(&mut self, layer: u8) {
        if layer < MAX_LAYERS {
            self.0 ^= 1 << layer;
        }
    }

    /// Turn on `layer` and turn off every other layer, as `layer_move` does.
    pub fn move_to(&mut self, layer: u8) {
        self.0 = 0;
        self.on(layer);
    }

    /// `get_highest_layer(state | default_state)`, 0 when nothing is active
    pub const fn highest(self, default_layer: u8) -> u8 {
        let state = if default_layer < MAX_LAYERS {
            self.0 | (1 << default_layer)
        } else {
            self.0
        };
        if state == 0 {
            0
        } else {
            (31 - state.leading_zeros()) as u8
        }
    }
}
