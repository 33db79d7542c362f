//! Keymap specific behavior of the keyboard.

use keymap_types::keycode::HidKeyCode;
use keymap_types::protocol::layer_status::{DEFAULT_LAYER_REPORT_ID, MAX_KEYBOARD_ID};

/// Config for configurable action behavior
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig<'a> {
    pub notifier: LayerNotifierConfig<'a>,
    pub macro_strings: MacroStringConfig<'a>,
    pub layer_report: LayerReportConfig,
}

/// Who switches the layer of a `MO()` key that has a notifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifierMode {
    /// The hook turns the layer on/off itself and stops default processing
    #[default]
    Intercept,
    /// The hook only presses the notifier key, default processing switches the layer
    PassThrough,
}

/// Notifier keys, pressed for as long as a `MO()` key of their layer is held.
///
/// `keys[n]` is the notifier of layer `n`. Layer 0 has an entry too but is never
/// reached, `MO(0)` is not intercepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayerNotifierConfig<'a> {
    pub keys: &'a [Option<HidKeyCode>],
    pub mode: NotifierMode,
}

impl<'a> LayerNotifierConfig<'a> {
    pub const fn new(keys: &'a [Option<HidKeyCode>], mode: NotifierMode) -> Self {
        Self { keys, mode }
    }

    pub fn key_for(&self, layer: u8) -> Option<HidKeyCode> {
        self.keys.get(layer as usize).copied().flatten()
    }
}

/// Strings typed by the custom keycodes `SAFE_RANGE + n`
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroStringConfig<'a> {
    pub strings: &'a [&'a str],
}

impl<'a> MacroStringConfig<'a> {
    pub const fn new(strings: &'a [&'a str]) -> Self {
        Self { strings }
    }

    pub fn get(&self, index: u16) -> Option<&'a str> {
        self.strings.get(index as usize).copied()
    }
}

/// Config for the raw HID layer status report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerReportConfig {
    pub report_id: u8,
    /// Only the lower 7 bits are sent
    pub keyboard_id: u8,
}

impl LayerReportConfig {
    pub const fn new(report_id: u8, keyboard_id: u8) -> Self {
        Self {
            report_id,
            keyboard_id: keyboard_id & MAX_KEYBOARD_ID,
        }
    }
}

impl Default for LayerReportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER_REPORT_ID, 0)
    }
}
