use std::collections::HashMap;

use keymap_types::keycode::HidKeyCode;
use keymap_types::keycode::qmk::{self, KC_NO, KC_TRNS};
use once_cell::sync::Lazy;
use pest::Parser;
use pest::iterators::Pair;

use crate::error::{ConfigError, ConfigResult};
use crate::keymap_c::{KeymapParser, Rule};

/// QMK keycode names, including the long and short aliases
pub static KEYCODE_ALIAS: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (code, names) in KEYCODE_TABLE.iter() {
        for name in names {
            m.insert(*name, *code);
        }
    }
    m
});

/// Shortest commonly used name of each keycode
pub static KEYCODE_NAME: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (code, names) in KEYCODE_TABLE.iter() {
        if let Some(name) = names.first() {
            m.entry(*code).or_insert(*name);
        }
    }
    m
});

/// `(code, names)`, the first name is the one written back
static KEYCODE_TABLE: Lazy<Vec<(u16, Vec<&'static str>)>> = Lazy::new(|| {
    let mut t: Vec<(u16, Vec<&'static str>)> = Vec::new();

    // `KC_<KEY>` for keys whose QMK name is the upper case variant name
    macro_rules! add_key {
        ($($key:ident),+ $(,)?) => {
            $(
                t.push((HidKeyCode::$key as u16, vec![paste::paste! { stringify!([<KC_ $key:upper>]) }]));
            )+
        };
    }

    macro_rules! add_alias {
        ($code:expr => $($name:expr),+) => {
            t.push(($code as u16, vec![$($name),+]));
        };
    }

    add_alias!(KC_NO => "KC_NO", "XXXXXXX");
    add_alias!(KC_TRNS => "KC_TRNS", "KC_TRANSPARENT", "_______");
    add_key!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z);
    add_alias!(HidKeyCode::Kc1 => "KC_1");
    add_alias!(HidKeyCode::Kc2 => "KC_2");
    add_alias!(HidKeyCode::Kc3 => "KC_3");
    add_alias!(HidKeyCode::Kc4 => "KC_4");
    add_alias!(HidKeyCode::Kc5 => "KC_5");
    add_alias!(HidKeyCode::Kc6 => "KC_6");
    add_alias!(HidKeyCode::Kc7 => "KC_7");
    add_alias!(HidKeyCode::Kc8 => "KC_8");
    add_alias!(HidKeyCode::Kc9 => "KC_9");
    add_alias!(HidKeyCode::Kc0 => "KC_0");
    add_alias!(HidKeyCode::Enter => "KC_ENT", "KC_ENTER");
    add_alias!(HidKeyCode::Escape => "KC_ESC", "KC_ESCAPE");
    add_alias!(HidKeyCode::Backspace => "KC_BSPC", "KC_BACKSPACE");
    add_alias!(HidKeyCode::Tab => "KC_TAB");
    add_alias!(HidKeyCode::Space => "KC_SPC", "KC_SPACE");
    add_alias!(HidKeyCode::Minus => "KC_MINS", "KC_MINUS");
    add_alias!(HidKeyCode::Equal => "KC_EQL", "KC_EQUAL");
    add_alias!(HidKeyCode::LeftBracket => "KC_LBRC", "KC_LEFT_BRACKET");
    add_alias!(HidKeyCode::RightBracket => "KC_RBRC", "KC_RIGHT_BRACKET");
    add_alias!(HidKeyCode::Backslash => "KC_BSLS", "KC_BACKSLASH");
    add_alias!(HidKeyCode::NonusHash => "KC_NUHS", "KC_NONUS_HASH");
    add_alias!(HidKeyCode::Semicolon => "KC_SCLN", "KC_SEMICOLON");
    add_alias!(HidKeyCode::Quote => "KC_QUOT", "KC_QUOTE");
    add_alias!(HidKeyCode::Grave => "KC_GRV", "KC_GRAVE");
    add_alias!(HidKeyCode::Comma => "KC_COMM", "KC_COMMA");
    add_alias!(HidKeyCode::Dot => "KC_DOT");
    add_alias!(HidKeyCode::Slash => "KC_SLSH", "KC_SLASH");
    add_alias!(HidKeyCode::CapsLock => "KC_CAPS", "KC_CAPS_LOCK");
    add_key!(F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12);
    add_alias!(HidKeyCode::PrintScreen => "KC_PSCR", "KC_PRINT_SCREEN");
    add_alias!(HidKeyCode::ScrollLock => "KC_SCRL", "KC_SCROLL_LOCK", "KC_BRMD");
    add_alias!(HidKeyCode::Pause => "KC_PAUS", "KC_PAUSE", "KC_BRK", "KC_BRMU");
    add_alias!(HidKeyCode::Insert => "KC_INS", "KC_INSERT");
    add_key!(Home);
    add_alias!(HidKeyCode::PageUp => "KC_PGUP", "KC_PAGE_UP");
    add_alias!(HidKeyCode::Delete => "KC_DEL", "KC_DELETE");
    add_key!(End);
    add_alias!(HidKeyCode::PageDown => "KC_PGDN", "KC_PAGE_DOWN");
    add_alias!(HidKeyCode::Right => "KC_RGHT", "KC_RIGHT");
    add_key!(Left, Down, Up);
    add_alias!(HidKeyCode::NumLock => "KC_NUM", "KC_NUM_LOCK");
    add_alias!(HidKeyCode::KpSlash => "KC_PSLS", "KC_KP_SLASH");
    add_alias!(HidKeyCode::KpAsterisk => "KC_PAST", "KC_KP_ASTERISK");
    add_alias!(HidKeyCode::KpMinus => "KC_PMNS", "KC_KP_MINUS");
    add_alias!(HidKeyCode::KpPlus => "KC_PPLS", "KC_KP_PLUS");
    add_alias!(HidKeyCode::KpEnter => "KC_PENT", "KC_KP_ENTER");
    add_alias!(HidKeyCode::Kp1 => "KC_P1", "KC_KP_1");
    add_alias!(HidKeyCode::Kp2 => "KC_P2", "KC_KP_2");
    add_alias!(HidKeyCode::Kp3 => "KC_P3", "KC_KP_3");
    add_alias!(HidKeyCode::Kp4 => "KC_P4", "KC_KP_4");
    add_alias!(HidKeyCode::Kp5 => "KC_P5", "KC_KP_5");
    add_alias!(HidKeyCode::Kp6 => "KC_P6", "KC_KP_6");
    add_alias!(HidKeyCode::Kp7 => "KC_P7", "KC_KP_7");
    add_alias!(HidKeyCode::Kp8 => "KC_P8", "KC_KP_8");
    add_alias!(HidKeyCode::Kp9 => "KC_P9", "KC_KP_9");
    add_alias!(HidKeyCode::Kp0 => "KC_P0", "KC_KP_0");
    add_alias!(HidKeyCode::KpDot => "KC_PDOT", "KC_KP_DOT");
    add_alias!(HidKeyCode::NonusBackslash => "KC_NUBS", "KC_NONUS_BACKSLASH");
    add_alias!(HidKeyCode::Application => "KC_APP", "KC_APPLICATION");
    add_alias!(HidKeyCode::KbPower => "KC_KB_POWER");
    add_alias!(HidKeyCode::KpEqual => "KC_PEQL", "KC_KP_EQUAL");
    add_key!(F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24);
    add_alias!(HidKeyCode::Execute => "KC_EXEC", "KC_EXECUTE");
    add_key!(Help, Menu);
    add_alias!(HidKeyCode::Select => "KC_SLCT", "KC_SELECT");
    add_key!(Stop);
    add_alias!(HidKeyCode::Again => "KC_AGIN", "KC_AGAIN");
    add_key!(Undo, Cut, Copy);
    add_alias!(HidKeyCode::Paste => "KC_PSTE", "KC_PASTE");
    add_key!(Find);
    add_alias!(HidKeyCode::KbMute => "KC_KB_MUTE");
    add_alias!(HidKeyCode::KbVolumeUp => "KC_KB_VOLUME_UP");
    add_alias!(HidKeyCode::KbVolumeDown => "KC_KB_VOLUME_DOWN");
    add_alias!(HidKeyCode::KpComma => "KC_PCMM", "KC_KP_COMMA");
    add_alias!(HidKeyCode::International1 => "KC_INT1", "KC_INTERNATIONAL_1");
    add_alias!(HidKeyCode::International2 => "KC_INT2", "KC_INTERNATIONAL_2");
    add_alias!(HidKeyCode::International3 => "KC_INT3", "KC_INTERNATIONAL_3");
    add_alias!(HidKeyCode::International4 => "KC_INT4", "KC_INTERNATIONAL_4");
    add_alias!(HidKeyCode::International5 => "KC_INT5", "KC_INTERNATIONAL_5");
    add_alias!(HidKeyCode::Language1 => "KC_LNG1", "KC_LANGUAGE_1");
    add_alias!(HidKeyCode::Language2 => "KC_LNG2", "KC_LANGUAGE_2");
    add_alias!(HidKeyCode::SystemPower => "KC_PWR", "KC_SYSTEM_POWER");
    add_alias!(HidKeyCode::SystemSleep => "KC_SLEP", "KC_SYSTEM_SLEEP");
    add_alias!(HidKeyCode::SystemWake => "KC_WAKE", "KC_SYSTEM_WAKE");
    add_alias!(HidKeyCode::AudioMute => "KC_MUTE", "KC_AUDIO_MUTE");
    add_alias!(HidKeyCode::AudioVolUp => "KC_VOLU", "KC_AUDIO_VOL_UP");
    add_alias!(HidKeyCode::AudioVolDown => "KC_VOLD", "KC_AUDIO_VOL_DOWN");
    add_alias!(HidKeyCode::MediaNextTrack => "KC_MNXT", "KC_MEDIA_NEXT_TRACK");
    add_alias!(HidKeyCode::MediaPrevTrack => "KC_MPRV", "KC_MEDIA_PREV_TRACK");
    add_alias!(HidKeyCode::MediaStop => "KC_MSTP", "KC_MEDIA_STOP");
    add_alias!(HidKeyCode::MediaPlayPause => "KC_MPLY", "KC_MEDIA_PLAY_PAUSE");
    add_alias!(HidKeyCode::MediaSelect => "KC_MSEL", "KC_MEDIA_SELECT");
    add_alias!(HidKeyCode::MediaEject => "KC_EJCT", "KC_MEDIA_EJECT");
    add_key!(Mail);
    add_alias!(HidKeyCode::Calculator => "KC_CALC", "KC_CALCULATOR");
    add_alias!(HidKeyCode::MyComputer => "KC_MYCM", "KC_MY_COMPUTER");
    add_alias!(HidKeyCode::WwwSearch => "KC_WSCH", "KC_WWW_SEARCH");
    add_alias!(HidKeyCode::WwwHome => "KC_WHOM", "KC_WWW_HOME");
    add_alias!(HidKeyCode::WwwBack => "KC_WBAK", "KC_WWW_BACK");
    add_alias!(HidKeyCode::WwwForward => "KC_WFWD", "KC_WWW_FORWARD");
    add_alias!(HidKeyCode::WwwStop => "KC_WSTP", "KC_WWW_STOP");
    add_alias!(HidKeyCode::WwwRefresh => "KC_WREF", "KC_WWW_REFRESH");
    add_alias!(HidKeyCode::WwwFavorites => "KC_WFAV", "KC_WWW_FAVORITES");
    add_alias!(HidKeyCode::MediaFastForward => "KC_MFFD", "KC_MEDIA_FAST_FORWARD");
    add_alias!(HidKeyCode::MediaRewind => "KC_MRWD", "KC_MEDIA_REWIND");
    add_alias!(HidKeyCode::BrightnessUp => "KC_BRIU", "KC_BRIGHTNESS_UP");
    add_alias!(HidKeyCode::BrightnessDown => "KC_BRID", "KC_BRIGHTNESS_DOWN");
    add_alias!(HidKeyCode::ControlPanel => "KC_CPNL", "KC_CONTROL_PANEL");
    add_alias!(HidKeyCode::Assistant => "KC_ASST", "KC_ASSISTANT");
    add_alias!(HidKeyCode::MissionControl => "KC_MCTL", "KC_MISSION_CONTROL");
    add_alias!(HidKeyCode::Launchpad => "KC_LPAD", "KC_LAUNCHPAD");
    add_alias!(HidKeyCode::MouseUp => "MS_UP", "QK_MOUSE_CURSOR_UP");
    add_alias!(HidKeyCode::MouseDown => "MS_DOWN", "QK_MOUSE_CURSOR_DOWN");
    add_alias!(HidKeyCode::MouseLeft => "MS_LEFT", "QK_MOUSE_CURSOR_LEFT");
    add_alias!(HidKeyCode::MouseRight => "MS_RGHT", "QK_MOUSE_CURSOR_RIGHT");
    add_alias!(HidKeyCode::MouseBtn1 => "MS_BTN1", "QK_MOUSE_BUTTON_1");
    add_alias!(HidKeyCode::MouseBtn2 => "MS_BTN2", "QK_MOUSE_BUTTON_2");
    add_alias!(HidKeyCode::MouseBtn3 => "MS_BTN3", "QK_MOUSE_BUTTON_3");
    add_alias!(HidKeyCode::MouseBtn4 => "MS_BTN4", "QK_MOUSE_BUTTON_4");
    add_alias!(HidKeyCode::MouseBtn5 => "MS_BTN5", "QK_MOUSE_BUTTON_5");
    add_alias!(HidKeyCode::MouseWheelUp => "MS_WHLU", "QK_MOUSE_WHEEL_UP");
    add_alias!(HidKeyCode::MouseWheelDown => "MS_WHLD", "QK_MOUSE_WHEEL_DOWN");
    add_alias!(HidKeyCode::MouseWheelLeft => "MS_WHLL", "QK_MOUSE_WHEEL_LEFT");
    add_alias!(HidKeyCode::MouseWheelRight => "MS_WHLR", "QK_MOUSE_WHEEL_RIGHT");
    add_alias!(HidKeyCode::MouseAccel0 => "MS_ACL0", "QK_MOUSE_ACCELERATION_0");
    add_alias!(HidKeyCode::MouseAccel1 => "MS_ACL1", "QK_MOUSE_ACCELERATION_1");
    add_alias!(HidKeyCode::MouseAccel2 => "MS_ACL2", "QK_MOUSE_ACCELERATION_2");
    add_alias!(HidKeyCode::LCtrl => "KC_LCTL", "KC_LEFT_CTRL");
    add_alias!(HidKeyCode::LShift => "KC_LSFT", "KC_LEFT_SHIFT");
    add_alias!(HidKeyCode::LAlt => "KC_LALT", "KC_LEFT_ALT", "KC_LOPT");
    add_alias!(HidKeyCode::LGui => "KC_LGUI", "KC_LEFT_GUI", "KC_LCMD", "KC_LWIN");
    add_alias!(HidKeyCode::RCtrl => "KC_RCTL", "KC_RIGHT_CTRL");
    add_alias!(HidKeyCode::RShift => "KC_RSFT", "KC_RIGHT_SHIFT");
    add_alias!(HidKeyCode::RAlt => "KC_RALT", "KC_RIGHT_ALT", "KC_ROPT", "KC_ALGR");
    add_alias!(HidKeyCode::RGui => "KC_RGUI", "KC_RIGHT_GUI", "KC_RCMD", "KC_RWIN");

    // Shifted symbols, `LSFT(kc)`
    add_alias!(0x0235 => "KC_TILD", "KC_TILDE");
    add_alias!(0x021E => "KC_EXLM", "KC_EXCLAIM");
    add_alias!(0x021F => "KC_AT");
    add_alias!(0x0220 => "KC_HASH");
    add_alias!(0x0221 => "KC_DLR", "KC_DOLLAR");
    add_alias!(0x0222 => "KC_PERC", "KC_PERCENT");
    add_alias!(0x0223 => "KC_CIRC", "KC_CIRCUMFLEX");
    add_alias!(0x0224 => "KC_AMPR", "KC_AMPERSAND");
    add_alias!(0x0225 => "KC_ASTR", "KC_ASTERISK");
    add_alias!(0x0226 => "KC_LPRN", "KC_LEFT_PAREN");
    add_alias!(0x0227 => "KC_RPRN", "KC_RIGHT_PAREN");
    add_alias!(0x022D => "KC_UNDS", "KC_UNDERSCORE");
    add_alias!(0x022E => "KC_PLUS");
    add_alias!(0x022F => "KC_LCBR", "KC_LEFT_CURLY_BRACE");
    add_alias!(0x0230 => "KC_RCBR", "KC_RIGHT_CURLY_BRACE");
    add_alias!(0x0231 => "KC_PIPE");
    add_alias!(0x0233 => "KC_COLN", "KC_COLON");
    add_alias!(0x0234 => "KC_DQUO", "KC_DOUBLE_QUOTE", "KC_DQT");
    add_alias!(0x0236 => "KC_LABK", "KC_LEFT_ANGLE_BRACKET", "KC_LT");
    add_alias!(0x0237 => "KC_RABK", "KC_RIGHT_ANGLE_BRACKET", "KC_GT");
    add_alias!(0x0238 => "KC_QUES", "KC_QUESTION");

    add_alias!(qmk::RM_ON => "RM_ON", "QK_RGB_MATRIX_ON");
    add_alias!(qmk::RM_OFF => "RM_OFF", "QK_RGB_MATRIX_OFF");
    add_alias!(qmk::RM_TOGG => "RM_TOGG", "QK_RGB_MATRIX_TOGGLE");
    add_alias!(qmk::RM_NEXT => "RM_NEXT", "QK_RGB_MATRIX_MODE_NEXT");
    add_alias!(qmk::RM_PREV => "RM_PREV", "QK_RGB_MATRIX_MODE_PREVIOUS");
    add_alias!(qmk::RM_HUEU => "RM_HUEU", "QK_RGB_MATRIX_HUE_UP");
    add_alias!(qmk::RM_HUED => "RM_HUED", "QK_RGB_MATRIX_HUE_DOWN");
    add_alias!(qmk::RM_SATU => "RM_SATU", "QK_RGB_MATRIX_SATURATION_UP");
    add_alias!(qmk::RM_SATD => "RM_SATD", "QK_RGB_MATRIX_SATURATION_DOWN");
    add_alias!(qmk::RM_VALU => "RM_VALU", "QK_RGB_MATRIX_VALUE_UP");
    add_alias!(qmk::RM_VALD => "RM_VALD", "QK_RGB_MATRIX_VALUE_DOWN");
    add_alias!(qmk::RM_SPDU => "RM_SPDU", "QK_RGB_MATRIX_SPEED_UP");
    add_alias!(qmk::RM_SPDD => "RM_SPDD", "QK_RGB_MATRIX_SPEED_DOWN");
    add_alias!(qmk::QK_BOOT => "QK_BOOT", "QK_BOOTLOADER");

    t
});

/// 5-bit QMK modifier masks, the arguments of `LM()` and `MT()`
fn mod_mask(name: &str) -> Option<u16> {
    let mask = match name {
        "MOD_LCTL" => 0x01,
        "MOD_LSFT" => 0x02,
        "MOD_LALT" => 0x04,
        "MOD_LGUI" => 0x08,
        "MOD_RCTL" => 0x11,
        "MOD_RSFT" => 0x12,
        "MOD_RALT" => 0x14,
        "MOD_RGUI" => 0x18,
        "MOD_MEH" => 0x07,
        "MOD_HYPR" => 0x0F,
        _ => return None,
    };
    Some(mask)
}

/// Modifier wrapper functions, `LCTL(kc)` etc.
fn mod_function(name: &str) -> Option<u16> {
    let mods = match name {
        "LCTL" | "C" => 0x01,
        "LSFT" | "S" => 0x02,
        "LALT" | "A" | "LOPT" => 0x04,
        "LGUI" | "G" | "LCMD" | "LWIN" => 0x08,
        "RCTL" => 0x11,
        "RSFT" => 0x12,
        "RALT" | "ROPT" | "ALGR" => 0x14,
        "RGUI" | "RCMD" | "RWIN" => 0x18,
        "MEH" => 0x07,
        "HYPR" => 0x0F,
        _ => return None,
    };
    Some(mods)
}

/// Keycode of a QMK keycode name
pub fn keycode_from_name(name: &str) -> Option<u16> {
    KEYCODE_ALIAS.get(name).copied()
}

/// Name of a keycode, `None` for codes without a name in the table
pub fn keycode_name(code: u16) -> Option<&'static str> {
    KEYCODE_NAME.get(&code).copied()
}

/// Evaluate a keycode expression: `KC_A`, `MO(1)`, `LCTL(KC_C)`, `LT(1, KC_SPC)`,
/// `LM(2, MOD_LSFT)`, `LCTL_T(KC_ESC)`, `0x7E40`
pub fn parse_keycode_expr(expr: &str) -> ConfigResult<u16> {
    let mut pairs = KeymapParser::parse(Rule::keycode_expr, expr.trim())
        .map_err(|e| ConfigError::Parse(format!("Invalid keycode '{}': {}", expr, e)))?;
    let inner = pairs
        .next()
        .and_then(|p| p.into_inner().next())
        .ok_or_else(|| ConfigError::Parse(format!("Empty keycode expression '{}'", expr)))?;
    eval_expr(inner)
}

fn eval_expr(pair: Pair<Rule>) -> ConfigResult<u16> {
    match pair.as_rule() {
        Rule::expr => {
            let mut value = 0;
            for term in pair.into_inner() {
                value |= eval_expr(term)?;
            }
            Ok(value)
        }
        Rule::term => match pair.into_inner().next() {
            Some(inner) => eval_expr(inner),
            None => Err(ConfigError::Parse("Empty keycode term".to_string())),
        },
        Rule::number => parse_number(pair.as_str()),
        Rule::identifier => {
            let name = pair.as_str();
            keycode_from_name(name)
                .or_else(|| mod_mask(name))
                .ok_or_else(|| ConfigError::Parse(format!("Unknown keycode '{}'", name)))
        }
        Rule::call => eval_call(pair),
        rule => Err(ConfigError::Parse(format!("Unexpected rule {:?} in keycode expression", rule))),
    }
}

fn parse_number(s: &str) -> ConfigResult<u16> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| ConfigError::Parse(format!("Invalid number '{}': {}", s, e)))
}

fn eval_call(pair: Pair<Rule>) -> ConfigResult<u16> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str())
        .ok_or_else(|| ConfigError::Parse("Missing function name".to_string()))?;
    let args = inner.map(eval_expr).collect::<ConfigResult<Vec<u16>>>()?;
    let arity = |n: usize| -> ConfigResult<()> {
        if args.len() != n {
            return Err(ConfigError::Parse(format!(
                "{}() takes {} argument(s), got {}",
                name,
                n,
                args.len()
            )));
        }
        Ok(())
    };
    let layer = |value: u16, max: u16| -> ConfigResult<u8> {
        if value > max {
            return Err(ConfigError::Parse(format!("Layer {} out of range in {}()", value, name)));
        }
        Ok(value as u8)
    };

    let code = match name {
        "MO" | "TO" | "TG" | "DF" | "OSL" | "TT" => {
            arity(1)?;
            let l = layer(args[0], 31)?;
            match name {
                "MO" => qmk::mo(l),
                "TO" => qmk::to(l),
                "TG" => qmk::tg(l),
                "DF" => qmk::df(l),
                "OSL" => qmk::osl(l),
                _ => qmk::tt(l),
            }
        }
        "LT" => {
            arity(2)?;
            qmk::lt(layer(args[0], 15)?, args[1] as u8)
        }
        "LM" => {
            arity(2)?;
            qmk::lm(layer(args[0], 15)?, args[1] as u8)
        }
        "MT" => {
            arity(2)?;
            *qmk::QK_MOD_TAP.start() | ((args[0] & 0x1F) << 8) | (args[1] & 0xFF)
        }
        "OSM" => {
            arity(1)?;
            qmk::QK_ONE_SHOT_MOD | (args[0] & 0x1F)
        }
        _ => {
            if let Some(mods) = name.strip_suffix("_T").and_then(mod_function) {
                arity(1)?;
                *qmk::QK_MOD_TAP.start() | (mods << 8) | (args[0] & 0xFF)
            } else if let Some(mods) = mod_function(name) {
                arity(1)?;
                // Nested wrappers accumulate, `LCTL(LSFT(kc))`
                (mods << 8) | args[0]
            } else {
                return Err(ConfigError::Parse(format!("Unknown keycode function '{}'", name)));
            }
        }
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycode_names() {
        assert_eq!(keycode_from_name("KC_A"), Some(0x0004));
        assert_eq!(keycode_from_name("KC_F13"), Some(0x0068));
        assert_eq!(keycode_from_name("KC_HOME"), Some(0x004A));
        assert_eq!(keycode_from_name("KC_ENTER"), Some(0x0028));
        assert_eq!(keycode_from_name("KC_ENT"), Some(0x0028));
        assert_eq!(keycode_from_name("_______"), Some(0x0001));
        assert_eq!(keycode_from_name("XXXXXXX"), Some(0x0000));
        assert_eq!(keycode_from_name("KC_EXLM"), Some(0x021E));
        assert_eq!(keycode_from_name("RM_TOGG"), Some(0x7842));
        assert_eq!(keycode_from_name("KC_ALPHA"), None);

        assert_eq!(keycode_name(0x0028), Some("KC_ENT"));
        assert_eq!(keycode_name(0x0001), Some("KC_TRNS"));
        assert_eq!(keycode_name(0x00E1), Some("KC_LSFT"));
        assert_eq!(keycode_name(0x7C00), Some("QK_BOOT"));
    }

    #[test]
    fn test_parse_keycode_expr() {
        assert_eq!(parse_keycode_expr("KC_A").unwrap(), 0x0004);
        assert_eq!(parse_keycode_expr(" MO(1) ").unwrap(), 0x5221);
        assert_eq!(parse_keycode_expr("TO(2)").unwrap(), 0x5202);
        assert_eq!(parse_keycode_expr("TG(3)").unwrap(), 0x5263);
        assert_eq!(parse_keycode_expr("DF(1)").unwrap(), 0x5241);
        assert_eq!(parse_keycode_expr("OSL(2)").unwrap(), 0x5282);
        assert_eq!(parse_keycode_expr("TT(1)").unwrap(), 0x52C1);
        assert_eq!(parse_keycode_expr("LT(1, KC_SPC)").unwrap(), 0x412C);
        assert_eq!(parse_keycode_expr("LM(2, MOD_LSFT)").unwrap(), 0x5042);
        assert_eq!(parse_keycode_expr("LM(1, MOD_LCTL | MOD_LSFT)").unwrap(), 0x5023);
        assert_eq!(parse_keycode_expr("S(KC_1)").unwrap(), 0x021E);
        assert_eq!(parse_keycode_expr("LCTL(LSFT(KC_A))").unwrap(), 0x0304);
        assert_eq!(parse_keycode_expr("LCTL_T(KC_ESC)").unwrap(), 0x2129);
        assert_eq!(parse_keycode_expr("MT(MOD_LSFT, KC_Z)").unwrap(), 0x221D);
        assert_eq!(parse_keycode_expr("0x7E40").unwrap(), 0x7E40);
        assert_eq!(parse_keycode_expr("4").unwrap(), 4);
    }

    #[test]
    fn test_parse_keycode_expr_errors() {
        assert!(parse_keycode_expr("").is_err());
        assert!(parse_keycode_expr("KC_NOPE").is_err());
        assert!(parse_keycode_expr("MO(32)").is_err());
        assert!(parse_keycode_expr("MO(1, 2)").is_err());
        assert!(parse_keycode_expr("LT(16, KC_A)").is_err());
        assert!(parse_keycode_expr("FOO(KC_A)").is_err());
        assert!(parse_keycode_expr("MO(1").is_err());
        assert!(parse_keycode_expr("0x10000").is_err());
    }
}
