//! `keycodes.json` generation and keycode value parsing.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use log::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{KeycodesJson, LayerKey, QmkKeycodesSpec};

/// Names written to `keycodes.json` whenever a keycode has one of them
pub const PREFERRED_NAMES: &[&str] = &[
    "KC_TRNS", "KC_ESC", "KC_ENT", "KC_BSPC", "KC_LCTL", "KC_RCTL", "KC_LSFT", "KC_RSFT", "KC_LALT", "KC_RALT",
    "KC_LGUI", "KC_RGUI", "KC_SCLN", "KC_QUOT", "KC_COMM", "KC_MINS", "KC_EQL", "KC_BSLS", "KC_GRV", "KC_SLSH",
    "KC_LBRC", "KC_RBRC", "KC_SPC", "KC_APP", "KC_PSCR", "KC_SCRL", "KC_NUHS", "KC_NUBS", "KC_LCBR", "KC_RCBR",
    "KC_LPRN", "KC_RPRN", "KC_TILD", "KC_EXLM", "KC_AT", "KC_HASH", "KC_DLR", "KC_PERC", "KC_CIRC", "KC_AMPR",
    "KC_ASTR", "KC_UNDS", "KC_PLUS", "KC_PIPE", "KC_COLN", "KC_DQUO", "KC_LABK", "KC_RABK", "KC_QUES",
];

/// `"0x7E40"` to `0x7E40`, the `0x` prefix is required
pub fn parse_hex_keycode(s: &str) -> Option<u16> {
    let s = s.trim();
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u16::from_str_radix(hex, 16).ok()
}

/// Numeric value of a layer key: integers, hex strings and decimal strings. Names give `None`.
pub fn parse_keycode_value(key: &LayerKey) -> Option<u16> {
    match key {
        LayerKey::Code(code) => u16::try_from(*code).ok(),
        LayerKey::Name(name) => parse_keycode_str(name),
    }
}

pub fn parse_keycode_str(name: &str) -> Option<u16> {
    let name = name.trim();
    if name.starts_with("0x") || name.starts_with("0X") {
        parse_hex_keycode(name)
    } else if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}

fn is_fallback_name(name: &str) -> bool {
    name == "KC_TRNS" || name == "KC_NO"
}

/// Whether `name` replaces `current` as the name of a code
fn prefer(name: &str, current: &str) -> bool {
    if PREFERRED_NAMES.contains(&current) {
        return false;
    }
    if PREFERRED_NAMES.contains(&name) || is_fallback_name(name) {
        return true;
    }
    if is_fallback_name(current) {
        return false;
    }
    name.len() < current.len()
}

/// Pick one name per keycode of the QMK spec, sorted by code.
///
/// Preferred names win, then `KC_TRNS`/`KC_NO`, then the shortest name. Ties keep the first seen.
pub fn generate_keycodes(spec: &QmkKeycodesSpec) -> KeycodesJson {
    let mut code_to_name: BTreeMap<u16, &str> = BTreeMap::new();
    for (hex_code, info) in &spec.keycodes {
        let Some(code) = parse_hex_keycode(hex_code) else {
            warn!("Skipping non-hex keycode entry: {}", hex_code);
            continue;
        };
        let names = info.key.iter().chain(info.aliases.iter().flatten());
        for name in names.filter(|n| !n.is_empty()) {
            if code_to_name.get(&code).is_none_or(|current| prefer(name, current)) {
                code_to_name.insert(code, name);
            }
        }
    }

    code_to_name
        .into_iter()
        .map(|(code, name)| (format!("0x{:04X}", code), name.to_string()))
        .collect()
}

/// Code of the `SAFE_RANGE` entry
pub fn safe_range_start(keycodes: &KeycodesJson) -> ConfigResult<u16> {
    let (code, _) = keycodes
        .iter()
        .find(|(_, name)| name.as_str() == "SAFE_RANGE")
        .ok_or_else(|| ConfigError::MissingField("SAFE_RANGE in keycodes.json".to_string()))?;
    parse_hex_keycode(code).ok_or_else(|| ConfigError::InvalidValue {
        field: "SAFE_RANGE".to_string(),
        value: code.clone(),
        expected: "a hex keycode".to_string(),
    })
}

/// `keycodes.json` keyed by value, entries whose key isn't hex are skipped with a warning
pub fn keycodes_by_value(keycodes: &IndexMap<String, String>) -> HashMap<u16, String> {
    let mut map = HashMap::new();
    for (k, v) in keycodes {
        match parse_hex_keycode(k) {
            Some(code) => {
                map.insert(code, v.clone());
            }
            None => warn!("Skipping non-hex keycode entry: {}", k),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_hex_keycode() {
        assert_eq!(parse_hex_keycode("0x7E40"), Some(0x7E40));
        assert_eq!(parse_hex_keycode(" 0X0004 "), Some(4));
        assert_eq!(parse_hex_keycode("7E40"), None);
        assert_eq!(parse_hex_keycode("0xZZ"), None);
        assert_eq!(parse_hex_keycode("0x10000"), None);
    }

    #[test]
    fn test_parse_keycode_value() {
        assert_eq!(parse_keycode_value(&LayerKey::Code(4)), Some(4));
        assert_eq!(parse_keycode_value(&LayerKey::Code(0x1_0000)), None);
        assert_eq!(parse_keycode_value(&LayerKey::from("0x0004")), Some(4));
        assert_eq!(parse_keycode_value(&LayerKey::from("32320")), Some(0x7E40));
        assert_eq!(parse_keycode_value(&LayerKey::from("KC_B")), None);
        assert_eq!(parse_keycode_value(&LayerKey::from("")), None);
    }

    #[test]
    fn test_generate_keycodes() {
        let spec: QmkKeycodesSpec = serde_json::from_value(json!({
            "keycodes": {
                "0x0028": {"key": "KC_ENTER", "aliases": ["KC_ENT"]},
                "0x0001": {"key": "KC_TRANSPARENT", "aliases": ["_______", "KC_TRNS"]},
                "0x0000": {"key": "KC_NO", "aliases": ["XXXXXXX"]},
                "0x0004": {"key": "KC_A"},
                "0x004A": {"key": "KC_HOME"},
                "0x0049": {"key": "KC_INSERT", "aliases": ["KC_INS"]},
                "0x7E40": {"key": "SAFE_RANGE"},
                "bad": {"key": "KC_BAD"},
                "0x00A5": {"aliases": ["KC_PWR"]}
            }
        }))
        .unwrap();
        let keycodes = generate_keycodes(&spec);
        let entries: Vec<(&str, &str)> = keycodes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            entries,
            vec![
                ("0x0000", "KC_NO"),
                ("0x0001", "KC_TRNS"),
                ("0x0004", "KC_A"),
                ("0x0028", "KC_ENT"),
                ("0x0049", "KC_INS"),
                ("0x004A", "KC_HOME"),
                ("0x00A5", "KC_PWR"),
                ("0x7E40", "SAFE_RANGE"),
            ]
        );
        assert_eq!(safe_range_start(&keycodes).unwrap(), 0x7E40);
    }

    #[test]
    fn test_safe_range_missing() {
        let keycodes: KeycodesJson = [("0x0004".to_string(), "KC_A".to_string())].into_iter().collect();
        assert!(safe_range_start(&keycodes).is_err());
        assert_eq!(keycodes_by_value(&keycodes)[&4], "KC_A");
    }
}
