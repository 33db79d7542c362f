//! Conversion between QMK 16-bit keycodes and [`KeyAction`].

use keymap_types::action::{Action, KeyAction};
use keymap_types::keycode::HidKeyCode;
use keymap_types::keycode::qmk::{
    self, KC_NO, KC_TRNS, QK_BOOT, QK_KB, QK_LAYER_MOD, QK_LAYER_TAP, QK_LIGHTING, QK_MOD_TAP, QK_MODS,
    QK_ONE_SHOT_MOD, QK_USER, SAFE_RANGE,
};
use keymap_types::modifier::ModifierCombination;
use log::warn;

/// Encode a key action as a QMK keycode, 0 (`KC_NO`) if QMK has no representation of it.
pub fn to_qmk_keycode(key_action: KeyAction) -> u16 {
    match key_action {
        KeyAction::No => KC_NO,
        KeyAction::Transparent => KC_TRNS,
        KeyAction::Single(a) => match a {
            Action::No => KC_NO,
            Action::Transparent => KC_TRNS,
            Action::Key(k) => k as u16,
            Action::KeyWithModifier(k, m) => ((m.to_qmk_mods() as u16) << 8) | k as u16,
            Action::Modifier(m) => modifier_keycode(m),
            Action::LayerOn(l) => qmk::mo(l),
            Action::LayerOnWithModifier(l, m) => qmk::lm(l, m.to_qmk_mods()),
            Action::LayerToggle(l) => qmk::tg(l),
            Action::DefaultLayer(l) => qmk::df(l),
            Action::LayerToggleOnly(l) => qmk::to(l),
            Action::Quantum(code) => code,
            Action::User(i) => qmk::user(i),
        },
        KeyAction::TapHold(tap, hold) => match (tap, hold) {
            (Action::Key(k), Action::LayerOn(l)) if l < 16 => qmk::lt(l, k as u8),
            (Action::Key(k), Action::Modifier(m)) => *QK_MOD_TAP.start() | ((m.to_qmk_mods() as u16) << 8) | k as u16,
            (Action::LayerToggle(t), Action::LayerOn(l)) if t == l => qmk::tt(l),
            _ => {
                warn!("Tap hold {:?} {:?} has no QMK keycode", tap, hold);
                KC_NO
            }
        },
        KeyAction::OneShot(a) => match a {
            Action::LayerOn(l) => qmk::osl(l),
            Action::Modifier(m) => QK_ONE_SHOT_MOD | m.to_qmk_mods() as u16,
            _ => {
                warn!("One shot {:?} has no QMK keycode", a);
                KC_NO
            }
        },
    }
}

/// A bare modifier combination is encoded as its first modifier key with the rest as mods.
fn modifier_keycode(m: ModifierCombination) -> u16 {
    let right = m.right();
    let (key, rest) = if m.ctrl() {
        (if right { HidKeyCode::RCtrl } else { HidKeyCode::LCtrl }, m.with_ctrl(false))
    } else if m.shift() {
        (if right { HidKeyCode::RShift } else { HidKeyCode::LShift }, m.with_shift(false))
    } else if m.alt() {
        (if right { HidKeyCode::RAlt } else { HidKeyCode::LAlt }, m.with_alt(false))
    } else if m.gui() {
        (if right { HidKeyCode::RGui } else { HidKeyCode::LGui }, m.with_gui(false))
    } else {
        return KC_NO;
    };
    let rest = if rest.with_right(false).is_empty() { 0 } else { rest.to_qmk_mods() };
    ((rest as u16) << 8) | key as u16
}

/// Modifier keycode as a modifier combination, `None` for other keys
fn key_to_modifier(key: HidKeyCode) -> Option<ModifierCombination> {
    let m = ModifierCombination::new();
    let m = match key {
        HidKeyCode::LCtrl => m.with_ctrl(true),
        HidKeyCode::LShift => m.with_shift(true),
        HidKeyCode::LAlt => m.with_alt(true),
        HidKeyCode::LGui => m.with_gui(true),
        HidKeyCode::RCtrl => m.with_ctrl(true).with_right(true),
        HidKeyCode::RShift => m.with_shift(true).with_right(true),
        HidKeyCode::RAlt => m.with_alt(true).with_right(true),
        HidKeyCode::RGui => m.with_gui(true).with_right(true),
        _ => return None,
    };
    Some(m)
}

/// Convert a QMK keycode to KeyAction.
pub fn from_qmk_keycode(keycode: u16) -> KeyAction {
    match keycode {
        KC_NO => KeyAction::No,
        KC_TRNS => KeyAction::Transparent,
        0x0002..=0x00FF => {
            let key = HidKeyCode::from(keycode as u8);
            if key == HidKeyCode::No {
                warn!("Basic keycode {:#X} is not defined", keycode);
                return KeyAction::No;
            }
            match key_to_modifier(key) {
                Some(m) => KeyAction::Single(Action::Modifier(m)),
                None => KeyAction::Single(Action::Key(key)),
            }
        }
        k if QK_MODS.contains(&k) => {
            let key = HidKeyCode::from(k as u8);
            let modifier = ModifierCombination::from_qmk_mods((k >> 8) as u8);
            match key_to_modifier(key) {
                Some(m) => KeyAction::Single(Action::Modifier(m | modifier)),
                None => KeyAction::Single(Action::KeyWithModifier(key, modifier)),
            }
        }
        k if QK_MOD_TAP.contains(&k) => {
            let key = HidKeyCode::from(k as u8);
            let modifier = ModifierCombination::from_qmk_mods((k >> 8) as u8);
            KeyAction::TapHold(Action::Key(key), Action::Modifier(modifier))
        }
        k if QK_LAYER_TAP.contains(&k) => {
            let layer = ((k >> 8) & 0x0F) as u8;
            let key = HidKeyCode::from(k as u8);
            KeyAction::TapHold(Action::Key(key), Action::LayerOn(layer))
        }
        k if QK_LAYER_MOD.contains(&k) => {
            let layer = ((k >> 5) & 0x0F) as u8;
            let modifier = ModifierCombination::from_qmk_mods(k as u8);
            KeyAction::Single(Action::LayerOnWithModifier(layer, modifier))
        }
        0x5200..=0x521F => KeyAction::Single(Action::LayerToggleOnly(keycode as u8 & 0x1F)),
        0x5220..=0x523F => KeyAction::Single(Action::LayerOn(keycode as u8 & 0x1F)),
        0x5240..=0x525F => KeyAction::Single(Action::DefaultLayer(keycode as u8 & 0x1F)),
        0x5260..=0x527F => KeyAction::Single(Action::LayerToggle(keycode as u8 & 0x1F)),
        0x5280..=0x529F => KeyAction::OneShot(Action::LayerOn(keycode as u8 & 0x1F)),
        0x52A0..=0x52BF => KeyAction::OneShot(Action::Modifier(ModifierCombination::from_qmk_mods(keycode as u8))),
        0x52C0..=0x52DF => {
            let layer = keycode as u8 & 0x1F;
            KeyAction::TapHold(Action::LayerToggle(layer), Action::LayerOn(layer))
        }
        k if QK_LIGHTING.contains(&k) || k == QK_BOOT || QK_KB.contains(&k) => KeyAction::Single(Action::Quantum(k)),
        k if QK_USER.contains(&k) => KeyAction::Single(Action::User(k - SAFE_RANGE)),
        _ => {
            warn!("QMK keycode {:#X} is not processed", keycode);
            KeyAction::No
        }
    }
}

#[cfg(test)]
mod test {
    use keymap_types::modifier::{ALT, CTRL, RIGHT, SHIFT};

    use super::*;

    #[test]
    fn test_convert_basic_keycodes() {
        assert_eq!(from_qmk_keycode(0x0000), KeyAction::No);
        assert_eq!(from_qmk_keycode(0x0001), KeyAction::Transparent);
        assert_eq!(from_qmk_keycode(0x0004), KeyAction::Single(Action::Key(HidKeyCode::A)));
        assert_eq!(from_qmk_keycode(0x006B), KeyAction::Single(Action::Key(HidKeyCode::F16)));
        assert_eq!(from_qmk_keycode(0x00AE), KeyAction::Single(Action::Key(HidKeyCode::MediaPlayPause)));
        assert_eq!(from_qmk_keycode(0x00E1), KeyAction::Single(Action::Modifier(SHIFT)));
        assert_eq!(from_qmk_keycode(0x00E6), KeyAction::Single(Action::Modifier(ALT | RIGHT)));
        // Hole between the system and mouse blocks
        assert_eq!(from_qmk_keycode(0x00C5), KeyAction::No);

        assert_eq!(to_qmk_keycode(KeyAction::Single(Action::Key(HidKeyCode::Up))), 0x0052);
        assert_eq!(to_qmk_keycode(KeyAction::Single(Action::Modifier(SHIFT))), 0x00E1);
        assert_eq!(to_qmk_keycode(KeyAction::Single(Action::Modifier(ALT | RIGHT))), 0x00E6);
    }

    #[test]
    fn test_convert_modified_keycodes() {
        // LSFT(KC_1)
        assert_eq!(
            from_qmk_keycode(0x021E),
            KeyAction::Single(Action::KeyWithModifier(HidKeyCode::Kc1, SHIFT))
        );
        // C(S(KC_A))
        let action = KeyAction::Single(Action::KeyWithModifier(HidKeyCode::A, CTRL | SHIFT));
        assert_eq!(from_qmk_keycode(0x0304), action);
        assert_eq!(to_qmk_keycode(action), 0x0304);
    }

    #[test]
    fn test_convert_layer_keycodes() {
        assert_eq!(from_qmk_keycode(0x5221), KeyAction::Single(Action::LayerOn(1)));
        assert_eq!(from_qmk_keycode(0x5202), KeyAction::Single(Action::LayerToggleOnly(2)));
        assert_eq!(from_qmk_keycode(0x5241), KeyAction::Single(Action::DefaultLayer(1)));
        assert_eq!(from_qmk_keycode(0x5263), KeyAction::Single(Action::LayerToggle(3)));
        assert_eq!(from_qmk_keycode(0x5282), KeyAction::OneShot(Action::LayerOn(2)));
        assert_eq!(from_qmk_keycode(0x52A2), KeyAction::OneShot(Action::Modifier(SHIFT)));
        assert_eq!(
            from_qmk_keycode(0x52C1),
            KeyAction::TapHold(Action::LayerToggle(1), Action::LayerOn(1))
        );
        // LT(1, KC_SPC)
        assert_eq!(
            from_qmk_keycode(0x412C),
            KeyAction::TapHold(Action::Key(HidKeyCode::Space), Action::LayerOn(1))
        );
        // LM(2, MOD_LSFT)
        assert_eq!(
            from_qmk_keycode(0x5042),
            KeyAction::Single(Action::LayerOnWithModifier(2, SHIFT))
        );
        // LCTL_T(KC_ESC)
        assert_eq!(
            from_qmk_keycode(0x2129),
            KeyAction::TapHold(Action::Key(HidKeyCode::Escape), Action::Modifier(CTRL))
        );

        for code in [0x5221, 0x5202, 0x5241, 0x5263, 0x5282, 0x52A2, 0x52C1, 0x412C, 0x5042, 0x2129] {
            assert_eq!(to_qmk_keycode(from_qmk_keycode(code)), code);
        }
    }

    #[test]
    fn test_convert_quantum_and_user_keycodes() {
        assert_eq!(from_qmk_keycode(0x7C00), KeyAction::Single(Action::Quantum(0x7C00)));
        assert_eq!(from_qmk_keycode(0x7842), KeyAction::Single(Action::Quantum(0x7842)));
        assert_eq!(from_qmk_keycode(0x7E40), KeyAction::Single(Action::User(0)));
        assert_eq!(from_qmk_keycode(0x7E57), KeyAction::Single(Action::User(23)));
        assert_eq!(to_qmk_keycode(KeyAction::Single(Action::User(5))), 0x7E45);
        // Swap hands range is not supported
        assert_eq!(from_qmk_keycode(0x5600), KeyAction::No);
    }
}
