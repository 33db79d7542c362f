//! Conversions between Vitaly layout dumps (`layout[layer][row][col]`) and QMK keymap JSON
//! (`layers[layer][index in the LAYOUT macro]`).

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{CustomKeycodesJson, KeyboardJson, LayerKey, QmkKeymapJson, VitalyJson};

/// Layout macro the keymaps are written against
pub const LAYOUT_NAME: &str = "LAYOUT";

/// `(row, col)` to the index of the key in the layout macro
pub type LayoutMap = IndexMap<(u8, u8), usize>;

fn build_layout_map(keyboard: &KeyboardJson, layout_name: &str) -> ConfigResult<LayoutMap> {
    Ok(keyboard
        .layout_keys(layout_name)?
        .iter()
        .enumerate()
        .map(|(i, key)| (key.matrix, i))
        .collect())
}

/// Layout map of `layout_name`, an error if the keyboard doesn't define it
pub fn layout_map(keyboard: &KeyboardJson, layout_name: &str) -> ConfigResult<LayoutMap> {
    if keyboard.layouts.is_empty() {
        return Err(ConfigError::Keymap("No layouts found in keyboard.json".to_string()));
    }
    build_layout_map(keyboard, layout_name)
}

/// Layout map of `LAYOUT`, or of the first layout when there is no `LAYOUT`
pub fn default_layout_map(keyboard: &KeyboardJson) -> Option<LayoutMap> {
    let name = if keyboard.layouts.contains_key(LAYOUT_NAME) {
        LAYOUT_NAME
    } else {
        keyboard.layouts.keys().next()?.as_str()
    };
    build_layout_map(keyboard, name).ok()
}

/// Place each grid key at its layout index, positions the grid doesn't cover are `KC_NO`
pub fn flatten_layer(grid: &[Vec<LayerKey>], layout_map: &LayoutMap) -> ConfigResult<Vec<LayerKey>> {
    let Some(max_idx) = layout_map.values().max() else {
        return Err(ConfigError::Keymap("Layout map is empty".to_string()));
    };
    let mut flattened = vec![LayerKey::from("KC_NO"); max_idx + 1];
    for (r, row) in grid.iter().enumerate() {
        for (c, key) in row.iter().enumerate() {
            if let (Ok(r), Ok(c)) = (u8::try_from(r), u8::try_from(c)) {
                if let Some(&idx) = layout_map.get(&(r, c)) {
                    flattened[idx] = key.clone();
                }
            }
        }
    }
    Ok(flattened)
}

/// Accept either per layer grids or already flat layers.
///
/// Without a layout map, grid rows are concatenated.
pub fn parse_layers(raw: &Value, source: &str, layout_map: Option<&LayoutMap>) -> ConfigResult<Vec<Vec<LayerKey>>> {
    if let Ok(grids) = serde_json::from_value::<Vec<Vec<Vec<LayerKey>>>>(raw.clone()) {
        return grids
            .iter()
            .map(|grid| match layout_map {
                Some(map) if !map.is_empty() => flatten_layer(grid, map),
                _ => Ok(grid.concat()),
            })
            .collect();
    }
    serde_json::from_value::<Vec<Vec<LayerKey>>>(raw.clone())
        .map_err(|_| ConfigError::Keymap(format!("Invalid {} layers", source)))
}

/// Present and not empty
fn non_empty(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        _ => true,
    })
}

/// Convert any Vitaly dump to a QMK keymap.
///
/// The input is a document with `layers` or `layout`, or a bare list of layers. Numeric keycodes
/// are named through `keycodes`, codes without a name are written as `0x%04X`.
pub fn vitaly_to_qmk(
    raw: &Value,
    keycodes: &HashMap<u16, String>,
    layout_map: Option<&LayoutMap>,
) -> ConfigResult<QmkKeymapJson> {
    let not_found = || ConfigError::Keymap("Could not find layers in input JSON".to_string());
    let layers = match raw {
        Value::Object(doc) => {
            if let Some(layers) = non_empty(doc.get("layers")) {
                parse_layers(layers, "vitaly.layers", layout_map)?
            } else if let Some(layout) = non_empty(doc.get("layout")) {
                parse_layers(layout, "vitaly.layout", layout_map)?
            } else {
                return Err(not_found());
            }
        }
        Value::Array(items) if matches!(items.first(), Some(Value::Array(_))) => {
            parse_layers(raw, "input", layout_map)?
        }
        _ => return Err(not_found()),
    };

    let layers = layers
        .into_iter()
        .map(|layer| {
            layer
                .into_iter()
                .map(|key| match key {
                    LayerKey::Code(code) => u16::try_from(code)
                        .ok()
                        .and_then(|c| keycodes.get(&c).cloned())
                        .unwrap_or_else(|| LayerKey::Code(code).to_string()),
                    LayerKey::Name(name) => name,
                })
                .collect()
        })
        .collect();
    Ok(QmkKeymapJson::new(layers, LAYOUT_NAME))
}

/// Convert a Vitaly layout through the `LAYOUT` macro of the keyboard, which must exist
pub fn qmk_keymap_from_vitaly(vitaly: &VitalyJson, keyboard: &KeyboardJson) -> ConfigResult<QmkKeymapJson> {
    let map = layout_map(keyboard, LAYOUT_NAME)?;
    let layers = vitaly
        .layout
        .iter()
        .map(|grid| Ok(flatten_layer(grid, &map)?.iter().map(|k| k.to_string()).collect()))
        .collect::<ConfigResult<Vec<Vec<String>>>>()?;
    Ok(QmkKeymapJson::new(layers, LAYOUT_NAME))
}

/// Write the layers of a QMK keymap back into the grid of a Vitaly dump.
///
/// Custom keycode names are mapped back to their hex value, unmapped matrix positions are `KC_NO`.
/// Every other field of `vitaly` is kept.
pub fn generate_vitaly_layout(
    keymap: &QmkKeymapJson,
    mut vitaly: VitalyJson,
    keyboard: &KeyboardJson,
    custom_keycodes: &CustomKeycodesJson,
    layout_name: &str,
) -> ConfigResult<VitalyJson> {
    let mapping: Vec<(u8, u8)> = keyboard.layout_keys(layout_name)?.iter().map(|k| k.matrix).collect();
    let (rows, cols) = mapping
        .iter()
        .fold((1, 1), |(rows, cols), &(r, c)| (rows.max(r as usize + 1), cols.max(c as usize + 1)));
    let custom_map: HashMap<&str, &str> = custom_keycodes.iter().map(|(k, v)| (v.as_str(), k.as_str())).collect();
    debug!("Vitaly grid {}x{}, {} custom keycodes", rows, cols, custom_map.len());

    let layers = keymap.layers.as_deref().unwrap_or_default();
    let mut layout = Vec::with_capacity(layers.len());
    for (layer_idx, flat_layer) in layers.iter().enumerate() {
        let mut grid = vec![vec![LayerKey::from("KC_NO"); cols]; rows];
        for (key_idx, keycode) in flat_layer.iter().enumerate() {
            let Some(&(r, c)) = mapping.get(key_idx) else {
                warn!("Layer {} has more keys than the layout definition", layer_idx);
                continue;
            };
            let keycode = custom_map.get(keycode.as_str()).copied().unwrap_or(keycode);
            grid[r as usize][c as usize] = LayerKey::from(keycode);
        }
        layout.push(grid);
    }
    vitaly.layout = layout;
    Ok(vitaly)
}
