use std::collections::HashMap;

use log::{debug, info, warn};

use crate::keycodes::{parse_hex_keycode, parse_keycode_str};
use crate::types::{CustomKeycodesJson, QmkKeymapJson};

/// Names of the transparent keycode
pub const TRANS_KEYS: &[&str] = &["KC_TRNS", "KC_TRANSPARENT", "_______"];

fn is_transparent(key: &str) -> bool {
    TRANS_KEYS.contains(&key)
}

/// Rename custom keycodes, then resolve transparent keys.
///
/// Keys whose numeric value is in `custom_keycodes` take the custom name. Without custom keycodes
/// that step is skipped. A transparent key on layer `i > 0` takes the first non transparent key at
/// the same position on layers `i - 1` down to `0`, it stays transparent when there is none.
pub fn postprocess_qmk_keymap(
    mut keymap: QmkKeymapJson,
    custom_keycodes: Option<&CustomKeycodesJson>,
) -> QmkKeymapJson {
    let Some(layers) = keymap.layers.as_mut() else {
        return keymap;
    };

    match custom_keycodes {
        Some(custom) => {
            let mut custom_map: HashMap<u16, &str> = HashMap::new();
            for (hex, name) in custom {
                match parse_hex_keycode(hex) {
                    Some(code) => {
                        custom_map.insert(code, name);
                    }
                    None => warn!("Skipping non-hex custom keycode: {}", hex),
                }
            }
            if custom_map.is_empty() || layers.is_empty() {
                debug!("No custom keycodes to apply");
            } else {
                let mut replaced = 0;
                for key in layers.iter_mut().flatten() {
                    if let Some(name) = parse_keycode_str(key).and_then(|code| custom_map.get(&code)) {
                        *key = name.to_string();
                        replaced += 1;
                    }
                }
                info!("Replaced {} custom keycodes", replaced);
            }
        }
        None => warn!("Custom keycodes unavailable, skipping keycode replacement"),
    }

    for i in 1..layers.len() {
        let (lower, upper) = layers.split_at_mut(i);
        for (idx, key) in upper[0].iter_mut().enumerate() {
            if !is_transparent(key) {
                continue;
            }
            let resolved = lower
                .iter()
                .rev()
                .filter_map(|layer| layer.get(idx))
                .find(|k| !is_transparent(k));
            if let Some(resolved) = resolved {
                *key = resolved.clone();
            }
        }
    }
    keymap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keymap(layers: &[&[&str]]) -> QmkKeymapJson {
        QmkKeymapJson::new(
            layers.iter().map(|l| l.iter().map(|k| k.to_string()).collect()).collect(),
            "LAYOUT",
        )
    }

    fn custom() -> CustomKeycodesJson {
        [
            ("0x0004".to_string(), "KC_ALPHA".to_string()),
            ("SAFE".to_string(), "KC_IGNORED".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_custom_keycodes_and_transparency() {
        let result = postprocess_qmk_keymap(keymap(&[&["0x0004", "KC_B"], &["KC_TRNS", "KC_TRNS"]]), Some(&custom()));
        assert_eq!(
            result.layers.unwrap(),
            vec![vec!["KC_ALPHA", "KC_B"], vec!["KC_ALPHA", "KC_B"]]
        );
    }

    #[test]
    fn test_decimal_keycode_is_replaced() {
        let result = postprocess_qmk_keymap(keymap(&[&["4", "KC_A"]]), Some(&custom()));
        assert_eq!(result.layers.unwrap(), vec![vec!["KC_ALPHA", "KC_A"]]);
    }

    #[test]
    fn test_transparency_walks_down_layers() {
        let result = postprocess_qmk_keymap(
            keymap(&[&["KC_A", "KC_TRNS", "KC_C"], &["_______", "KC_TRNS"], &["KC_TRANSPARENT", "KC_TRNS", "KC_TRNS"]]),
            None,
        );
        assert_eq!(
            result.layers.unwrap(),
            vec![
                vec!["KC_A", "KC_TRNS", "KC_C"],
                vec!["KC_A", "KC_TRNS"],
                vec!["KC_A", "KC_TRNS", "KC_C"],
            ]
        );
    }

    #[test]
    fn test_nearest_lower_layer_wins() {
        let result = postprocess_qmk_keymap(keymap(&[&["KC_A"], &["KC_B"], &["KC_TRNS"]]), None);
        assert_eq!(result.layers.unwrap()[2], vec!["KC_B"]);
    }

    #[test]
    fn test_missing_layers_untouched() {
        let mut empty = QmkKeymapJson::new(Vec::new(), "LAYOUT");
        empty.layers = None;
        let result = postprocess_qmk_keymap(empty, Some(&custom()));
        assert!(result.layers.is_none());
        assert_eq!(result.layout.as_deref(), Some("LAYOUT"));
    }
}
