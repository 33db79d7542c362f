//! DOIO KB16 rev2, keyboard id 2.
//!
//! Layers 0..=2 are cycled with `TO()`, layer 3 holds the RGB matrix controls and `QK_BOOT`.

use keymap_types::action::{EncoderAction, KeyAction};
use keymap_types::keycode::HidKeyCode;
use keymap_types::protocol::layer_status::DEFAULT_LAYER_REPORT_ID;

use crate::config::{BehaviorConfig, LayerNotifierConfig, LayerReportConfig, MacroStringConfig, NotifierMode};
use crate::{a, encoder, k, layer, mo, qk, to};

pub const ROW: usize = 4;
pub const COL: usize = 5;
pub const NUM_LAYER: usize = 4;
pub const NUM_ENCODER: usize = 3;

pub const KEYBOARD_ID: u8 = 2;
pub const VIAL_KEYBOARD_UID: [u8; 8] = [0x8F, 0x4D, 0x61, 0x58, 0x92, 0x50, 0x98, 0x7E];

pub const NOTIFIER_KEYS: [Option<HidKeyCode>; NUM_LAYER] = [
    Some(HidKeyCode::F16),
    Some(HidKeyCode::F17),
    Some(HidKeyCode::F18),
    Some(HidKeyCode::F19),
];

/// The notifier key is pressed along with the `MO()` key, the layer switch is left to the default processing
pub const BEHAVIOR: BehaviorConfig<'static> = BehaviorConfig {
    notifier: LayerNotifierConfig::new(&NOTIFIER_KEYS, NotifierMode::PassThrough),
    macro_strings: MacroStringConfig::new(&[]),
    layer_report: LayerReportConfig::new(DEFAULT_LAYER_REPORT_ID, KEYBOARD_ID),
};

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(MediaPlayPause)],
            [k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), to!(1)],
            [k!(Kc9), k!(Kc0), k!(Up), k!(Enter), k!(AudioMute)],
            [mo!(3), k!(Left), k!(Down), k!(Right), a!(No)]
        ]),
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), to!(2)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(No)]
        ]),
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), to!(0)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(No)]
        ]),
        layer!([
            [qk!(RM_SPDU), qk!(RM_SPDD), a!(Transparent), qk!(QK_BOOT), a!(Transparent)],
            [qk!(RM_SATU), qk!(RM_SATD), a!(Transparent), a!(Transparent), a!(Transparent)],
            [qk!(RM_TOGG), qk!(RM_NEXT), qk!(RM_HUEU), a!(Transparent), a!(Transparent)],
            [a!(Transparent), qk!(RM_VALU), qk!(RM_HUED), qk!(RM_VALD), a!(No)]
        ]),
    ]
}

/// `ENCODER_CCW_CW` pairs, `encoder!` takes the clockwise action first
#[rustfmt::skip]
pub const fn get_default_encoder_map() -> [[EncoderAction; NUM_ENCODER]; NUM_LAYER] {
    const TRNS: EncoderAction = encoder!(a!(Transparent), a!(Transparent));
    [
        [
            encoder!(k!(MediaNextTrack), k!(MediaPrevTrack)),
            encoder!(k!(PageUp), k!(PageDown)),
            encoder!(k!(AudioVolUp), k!(AudioVolDown)),
        ],
        [TRNS; NUM_ENCODER],
        [TRNS; NUM_ENCODER],
        [TRNS; NUM_ENCODER],
    ]
}

#[cfg(test)]
mod tests {
    use keymap_types::action::Action;

    use super::*;

    #[test]
    fn test_layer_cycle() {
        let keymap = get_default_keymap();
        assert_eq!(keymap[0][1][4], KeyAction::Single(Action::LayerToggleOnly(1)));
        assert_eq!(keymap[1][1][4], KeyAction::Single(Action::LayerToggleOnly(2)));
        assert_eq!(keymap[2][1][4], KeyAction::Single(Action::LayerToggleOnly(0)));
        assert_eq!(keymap[0][3][0], KeyAction::Single(Action::LayerOn(3)));
        assert_eq!(keymap[3][0][3], KeyAction::Single(Action::Quantum(0x7C00)));
        assert_eq!(keymap[3][2][0], KeyAction::Single(Action::Quantum(0x7842)));
    }

    #[test]
    fn test_encoder_map() {
        let encoders = get_default_encoder_map();
        assert_eq!(encoders[0][0].counter_clockwise(), k!(MediaPrevTrack));
        assert_eq!(encoders[0][2].clockwise(), k!(AudioVolUp));
        assert!(encoders[1..].iter().flatten().all(|e| e.clockwise().is_transparent()));
    }

    #[test]
    fn test_behavior() {
        assert_eq!(BEHAVIOR.notifier.mode, NotifierMode::PassThrough);
        assert_eq!(BEHAVIOR.notifier.key_for(3), Some(HidKeyCode::F19));
        assert_eq!(BEHAVIOR.macro_strings.get(0), None);
    }
}
