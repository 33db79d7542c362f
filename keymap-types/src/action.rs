//! Keyboard actions.
//!
//! Actions are what a keymap position resolves to:
//! - [`Action`] - Single operations that keyboards send or execute
//! - [`KeyAction`] - What a key does on press and release, possibly composed of two actions
//! - [`EncoderAction`] - Rotary encoder actions, one per direction

use crate::keycode::HidKeyCode;
use crate::modifier::ModifierCombination;

/// EncoderAction is the action at a encoder position, stored in encoder_map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: KeyAction,
    counter_clockwise: KeyAction,
}

impl Default for EncoderAction {
    fn default() -> Self {
        Self {
            clockwise: KeyAction::No,
            counter_clockwise: KeyAction::No,
        }
    }
}

impl EncoderAction {
    /// Create a new encoder action.
    pub const fn new(clockwise: KeyAction, counter_clockwise: KeyAction) -> Self {
        Self {
            clockwise,
            counter_clockwise,
        }
    }

    /// Same argument order as QMK's `ENCODER_CCW_CW`
    pub const fn ccw_cw(counter_clockwise: KeyAction, clockwise: KeyAction) -> Self {
        Self::new(clockwise, counter_clockwise)
    }

    pub fn clockwise(&self) -> KeyAction {
        self.clockwise
    }

    pub fn counter_clockwise(&self) -> KeyAction {
        self.counter_clockwise
    }

    pub fn set_clockwise(&mut self, clockwise: KeyAction) {
        self.clockwise = clockwise;
    }

    pub fn set_counter_clockwise(&mut self, counter_clockwise: KeyAction) {
        self.counter_clockwise = counter_clockwise;
    }
}

/// A KeyAction is the action at a keyboard position, stored in keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action. `KC_NO`, 0x0000.
    No,
    /// Transparent action, next layer will be checked. `KC_TRNS`, 0x0001.
    Transparent,
    /// A single action, triggered when pressed and cancelled when released.
    Single(Action),
    /// Tap action and hold action, as `LT()`, `MT()` and `TT()` keys.
    TapHold(Action, Action),
    /// Oneshot action, `OSL()` and `OSM()`.
    OneShot(Action),
}

impl KeyAction {
    /// The action of a `Single`, `Action::No` for other variants.
    pub fn to_action(self) -> Action {
        match self {
            KeyAction::Single(a) => a,
            _ => Action::No,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, KeyAction::No)
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, KeyAction::Transparent)
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Default action, no action.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A normal key stroke of the QMK basic range, including media and system keys.
    Key(HidKeyCode),
    /// Modifier combination.
    Modifier(ModifierCombination),
    /// Key stroke with modifier combination triggered, such as `LSFT(KC_1)`.
    KeyWithModifier(HidKeyCode, ModifierCombination),
    /// Activate a layer while held, `MO()`.
    LayerOn(u8),
    /// Activate a layer with modifier combination triggered, `LM()`.
    LayerOnWithModifier(u8, ModifierCombination),
    /// Toggle a layer, `TG()`.
    LayerToggle(u8),
    /// Set default layer, `DF()`.
    DefaultLayer(u8),
    /// Activate a layer and deactivate all other layers(except default layer), `TO()`.
    LayerToggleOnly(u8),
    /// QMK feature keycodes without a host side counterpart: lighting, bootloader, keyboard range.
    Quantum(u16),
    /// Custom keycode, the value is the offset from `SAFE_RANGE`.
    User(u16),
}

impl Action {
    /// Layer a momentary layer key switches to
    pub fn momentary_layer(&self) -> Option<u8> {
        match self {
            Action::LayerOn(layer) | Action::LayerOnWithModifier(layer, _) => Some(*layer),
            _ => None,
        }
    }
}
