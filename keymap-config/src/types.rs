//! Models of the JSON files exchanged with QMK, Vial and Vitaly.
//!
//! Every object keeps the fields it doesn't model in `extra`, so a file that is read and
//! written back loses nothing.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Fields of a JSON object that aren't modeled
pub type Extra = IndexMap<String, Value>;

/// `keycodes.json`: `"0x0004" -> "KC_A"`, sorted by code
pub type KeycodesJson = IndexMap<String, String>;

/// `custom-keycodes.json`: `"0x7E40" -> "KC_ALPHA"`, in `enum custom_keycodes` order
pub type CustomKeycodesJson = IndexMap<String, String>;

/// `key-to-layer.json`: notifier key to layer name, `"f13" -> "L0"`
pub type KeyToLayerJson = IndexMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct QmkKeycodeSpecEntry {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The keycode spec of QMK, `data/constants/keycodes/keycodes_<version>.hjson` merged into one document
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct QmkKeycodesSpec {
    #[serde(default)]
    pub keycodes: IndexMap<String, QmkKeycodeSpecEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn one() -> f64 {
    1.0
}

/// One key of a QMK layout macro
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LayoutKey {
    pub x: f64,
    pub y: f64,
    /// `[row, col]`
    pub matrix: (u8, u8),
    #[serde(default = "one")]
    pub w: f64,
    #[serde(default = "one")]
    pub h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Layout {
    pub layout: Vec<LayoutKey>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UsbConfig {
    pub vid: String,
    pub pid: String,
    pub device_version: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MatrixPins {
    pub cols: Vec<Option<String>>,
    pub rows: Vec<Option<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// QMK `keyboard.json`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct KeyboardJson {
    pub keyboard_name: String,
    pub layouts: IndexMap<String, Layout>,
    pub usb: UsbConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_pins: Option<MatrixPins>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KeyboardJson {
    pub fn layout_keys(&self, layout_name: &str) -> ConfigResult<&[LayoutKey]> {
        self.layouts
            .get(layout_name)
            .map(|l| l.layout.as_slice())
            .ok_or_else(|| ConfigError::Keymap(format!("Layout {} not found in keyboard.json", layout_name)))
    }

    /// `(rows, cols)` of the switch matrix.
    ///
    /// Taken from the matrix pins, keyboards without pins use the largest matrix position of their layouts.
    pub fn matrix_dimensions(&self) -> (usize, usize) {
        if let Some(pins) = &self.matrix_pins {
            return (pins.rows.len(), pins.cols.len());
        }
        self.layouts
            .values()
            .flat_map(|l| l.layout.iter())
            .fold((0, 0), |(rows, cols), key| {
                (rows.max(key.matrix.0 as usize + 1), cols.max(key.matrix.1 as usize + 1))
            })
    }
}

/// QMK keymap JSON, the `qmk c2json` / `qmk json2c` format
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct QmkKeymapJson {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub layers: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl QmkKeymapJson {
    pub fn new(layers: Vec<Vec<String>>, layout: &str) -> Self {
        Self {
            version: Some(1),
            layers: Some(layers),
            layout: Some(layout.to_string()),
            extra: Extra::new(),
        }
    }
}

/// A key of a Vitaly/Vial dump, either a keycode name or the raw 16-bit value
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LayerKey {
    Code(u32),
    Name(String),
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Code(code) => write!(f, "0x{:04X}", code),
            LayerKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for LayerKey {
    fn from(name: &str) -> Self {
        LayerKey::Name(name.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VialMatrix {
    pub rows: usize,
    pub cols: usize,
}

/// Property object of a KLE row, it applies to the label after it
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct KleKeyProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KleKeyProps {
    pub fn has_values(&self) -> bool {
        self.x.is_some() || self.w.is_some() || self.h.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum KleKey {
    Label(String),
    Props(KleKeyProps),
}

pub type KleRow = Vec<KleKey>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VialLayouts {
    pub keymap: Vec<KleRow>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Vial `vial.json`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VialJson {
    pub name: String,
    #[serde(rename = "vendorId")]
    pub vendor_id: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    pub matrix: VialMatrix,
    pub layouts: VialLayouts,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Vitaly layout dump, `layout[layer][row][col]`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VitalyJson {
    pub layout: Vec<Vec<Vec<LayerKey>>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn keyboard_json() -> Value {
        json!({
            "keyboard_name": "Test Keyboard",
            "manufacturer": "Sunaemon",
            "usb": {"vid": "0xFEED", "pid": "0x0001", "device_version": "1.0.0"},
            "matrix_pins": {"cols": ["GP0", "GP1"], "rows": ["GP2"]},
            "layouts": {
                "LAYOUT": {
                    "layout": [
                        {"matrix": [0, 0], "x": 0, "y": 0},
                        {"matrix": [0, 1], "x": 1, "y": 0, "w": 1.5}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_parse_keyboard_json() {
        let keyboard: KeyboardJson = serde_json::from_value(keyboard_json()).unwrap();
        assert_eq!(keyboard.keyboard_name, "Test Keyboard");
        assert!(keyboard.layouts.contains_key("LAYOUT"));
        assert_eq!(keyboard.matrix_dimensions(), (1, 2));
        let keys = keyboard.layout_keys("LAYOUT").unwrap();
        assert_eq!(keys[1].matrix, (0, 1));
        assert_eq!(keys[1].w, 1.5);
        assert_eq!(keys[0].h, 1.0);
        assert!(keyboard.layout_keys("LAYOUT_all").is_err());
        // Unknown fields survive a round trip
        assert_eq!(keyboard.extra["manufacturer"], "Sunaemon");
        assert_eq!(serde_json::to_value(&keyboard).unwrap()["manufacturer"], "Sunaemon");
    }

    #[test]
    fn test_matrix_dimensions_without_pins() {
        let mut raw = keyboard_json();
        raw.as_object_mut().unwrap().remove("matrix_pins");
        let keyboard: KeyboardJson = serde_json::from_value(raw).unwrap();
        assert_eq!(keyboard.matrix_dimensions(), (1, 2));
    }

    #[test]
    fn test_parse_qmk_keymap_json() {
        let keymap: QmkKeymapJson = serde_json::from_value(json!({
            "version": 1,
            "keyboard": "test",
            "layout": "LAYOUT",
            "layers": [["KC_A", "KC_B"], ["KC_TRNS", "KC_C"]]
        }))
        .unwrap();
        assert_eq!(keymap.version, Some(1));
        assert_eq!(keymap.layers.as_ref().map(|l| l.len()), Some(2));
        assert_eq!(keymap.extra["keyboard"], "test");
    }

    #[test]
    fn test_parse_vitaly_and_vial_json() {
        let vitaly: VitalyJson = serde_json::from_value(json!({
            "layout": [[["KC_A", 4]]],
            "encoder_layout": []
        }))
        .unwrap();
        assert_eq!(vitaly.layout.len(), 1);
        assert_eq!(vitaly.layout[0][0], vec![LayerKey::from("KC_A"), LayerKey::Code(4)]);
        assert_eq!(LayerKey::Code(0x7E40).to_string(), "0x7E40");

        let vial: VialJson = serde_json::from_value(json!({
            "name": "Test Keyboard",
            "vendorId": "0xFEED",
            "productId": "0x0001",
            "matrix": {"rows": 1, "cols": 2},
            "layouts": {"keymap": [["0,0", {"w": 1.5}, "0,1"]]}
        }))
        .unwrap();
        assert_eq!(vial.matrix.rows, 1);
        assert_eq!(vial.layouts.keymap[0][0], KleKey::Label("0,0".to_string()));
        assert!(matches!(&vial.layouts.keymap[0][1], KleKey::Props(p) if p.w == Some(1.5)));
    }

    #[test]
    fn test_parse_keycode_maps() {
        let keycodes: KeycodesJson = serde_json::from_value(json!({"0x0004": "KC_A", "0x7E40": "SAFE_RANGE"})).unwrap();
        assert_eq!(keycodes["0x0004"], "KC_A");
        let key_to_layer: KeyToLayerJson = serde_json::from_value(json!({"f13": "L1"})).unwrap();
        assert_eq!(key_to_layer["f13"], "L1");
    }
}
