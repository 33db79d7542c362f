//! Salicylic_acid3 7sKB, keyboard id 1.
//!
//! The matrix is stored in layout order: row `n` is the `n`th row of `LAYOUT()`,
//! shorter rows are padded with `KC_NO`.

use keymap_types::action::KeyAction;
use keymap_types::keycode::HidKeyCode;
use keymap_types::protocol::layer_status::DEFAULT_LAYER_REPORT_ID;

use crate::config::{BehaviorConfig, LayerNotifierConfig, LayerReportConfig, MacroStringConfig, NotifierMode};
use crate::greek::GREEK_STRINGS;
use crate::{a, greek, k, layer, mo};

pub const ROW: usize = 5;
pub const COL: usize = 15;
/// `DYNAMIC_KEYMAP_LAYER_COUNT`, only layers 0..=2 are defined
pub const NUM_LAYER: usize = 7;

pub const KEYBOARD_ID: u8 = 1;
pub const VIAL_KEYBOARD_UID: [u8; 8] = [0x8F, 0x41, 0x24, 0x61, 0xD4, 0x20, 0x30, 0x58];

pub const NOTIFIER_KEYS: [Option<HidKeyCode>; NUM_LAYER] = [
    Some(HidKeyCode::F13),
    Some(HidKeyCode::F14),
    Some(HidKeyCode::F15),
    None,
    None,
    None,
    None,
];

/// The `MO()` keys switch layers themselves, the Greek letters type their names
pub const BEHAVIOR: BehaviorConfig<'static> = BehaviorConfig {
    notifier: LayerNotifierConfig::new(&NOTIFIER_KEYS, NotifierMode::Intercept),
    macro_strings: MacroStringConfig::new(&GREEK_STRINGS),
    layer_report: LayerReportConfig::new(DEFAULT_LAYER_REPORT_ID, KEYBOARD_ID),
};

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [k!(Escape), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Minus), k!(Equal), k!(Backslash), k!(Grave)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(LeftBracket), k!(RightBracket), k!(Backspace), a!(No)],
            [k!(LCtrl), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote), k!(Enter), a!(No), a!(No)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), k!(RShift), mo!(1), a!(No), a!(No)],
            [mo!(2), k!(LAlt), k!(LGui), k!(Space), k!(Space), k!(Space), k!(Space), k!(RGui), k!(RAlt), k!(Application), k!(RCtrl), a!(No), a!(No), a!(No), a!(No)]
        ]),
        layer!([
            [a!(Transparent), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12), k!(Insert), k!(Delete)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(PrintScreen), k!(ScrollLock), k!(Pause), k!(Up), a!(Transparent), k!(Backspace), a!(No)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Home), k!(PageUp), k!(Left), k!(Right), a!(Transparent), a!(No), a!(No)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(End), k!(PageDown), k!(Down), a!(Transparent), a!(Transparent), a!(No), a!(No)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Stop), a!(Transparent), a!(Transparent), a!(Transparent), a!(No), a!(No), a!(No), a!(No)]
        ]),
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), greek!(Eta), greek!(Rho), greek!(Tau), greek!(Upsilon), greek!(Theta), greek!(Iota), greek!(Omicron), greek!(Pi), a!(Transparent), a!(Transparent), a!(Transparent), a!(No)],
            [a!(Transparent), greek!(Alpha), greek!(Sigma), greek!(Delta), greek!(Phi), greek!(Gamma), greek!(Eta), greek!(Chi), greek!(Kappa), greek!(Lambda), a!(Transparent), a!(Transparent), a!(Transparent), a!(No), a!(No)],
            [a!(Transparent), greek!(Zeta), greek!(Xi), greek!(Psi), greek!(Omega), greek!(Beta), greek!(Nu), greek!(Mu), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(No), a!(No)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(No), a!(No), a!(No), a!(No)]
        ]),
        [[KeyAction::No; COL]; ROW],
        [[KeyAction::No; COL]; ROW],
        [[KeyAction::No; COL]; ROW],
        [[KeyAction::No; COL]; ROW],
    ]
}

#[cfg(test)]
mod tests {
    use keymap_types::action::Action;

    use super::*;
    use crate::greek::GreekLetter;

    #[test]
    fn test_layout_rows() {
        let keymap = get_default_keymap();
        // KC_GRV closes the top row, MO(1) the fourth
        assert_eq!(keymap[0][0][14], k!(Grave));
        assert_eq!(keymap[0][3][12], KeyAction::Single(Action::LayerOn(1)));
        assert_eq!(keymap[0][4][0], KeyAction::Single(Action::LayerOn(2)));
        assert_eq!(keymap[1][1][11], k!(Up));
        assert_eq!(keymap[1][4][7], k!(Stop));
        assert_eq!(keymap[2][2][1], KeyAction::Single(Action::User(GreekLetter::Alpha as u16)));
        assert_eq!(keymap[2][3][4], KeyAction::Single(Action::User(GreekLetter::Omega as u16)));
        assert!(keymap[3..].iter().flatten().flatten().all(|a| *a == KeyAction::No));
    }

    #[test]
    fn test_behavior() {
        assert_eq!(BEHAVIOR.notifier.key_for(1), Some(HidKeyCode::F14));
        assert_eq!(BEHAVIOR.notifier.key_for(3), None);
        assert_eq!(BEHAVIOR.macro_strings.get(13), Some("/xi"));
        assert_eq!(BEHAVIOR.layer_report.keyboard_id, 1);
    }
}
