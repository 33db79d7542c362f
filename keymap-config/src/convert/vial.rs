use std::collections::BTreeMap;

use log::debug;

use crate::error::ConfigResult;
use crate::types::{Extra, KeyboardJson, KleKey, KleKeyProps, KleRow, LayoutKey, VialJson, VialLayouts, VialMatrix};

/// Key positions are handled in quarter units
const SUBDIVISIONS: f64 = 4.0;

fn quarter_steps(x: f64) -> i64 {
    (x * SUBDIVISIONS).round_ties_even() as i64
}

/// Round to the nearest quarter unit, halfway cases to even
fn round_unit(x: f64) -> f64 {
    (x * SUBDIVISIONS).round_ties_even() / SUBDIVISIONS
}

/// Build the Vial definition of a keyboard from its `layout_name` layout
pub fn generate_vial(keyboard: &KeyboardJson, layout_name: &str) -> ConfigResult<VialJson> {
    let (rows, cols) = keyboard.matrix_dimensions();
    let keys = keyboard.layout_keys(layout_name)?;

    // Rows keyed by their y position in quarter units
    let mut rows_by_y: BTreeMap<i64, Vec<&LayoutKey>> = BTreeMap::new();
    for key in keys {
        rows_by_y.entry(quarter_steps(key.y)).or_default().push(key);
    }
    debug!("{} keys in {} rows", keys.len(), rows_by_y.len());

    let mut keymap = Vec::with_capacity(rows_by_y.len());
    let mut cursor_y = 0.0;
    for (steps, row_keys) in rows_by_y {
        let mut row = build_kle_row(row_keys);
        let required_y = steps as f64 / SUBDIVISIONS;
        let y_diff = round_unit(required_y - cursor_y);
        if y_diff != 0.0 {
            match row.first_mut() {
                Some(KleKey::Props(props)) => props.y = Some(props.y.unwrap_or(0.0) + y_diff),
                _ => row.insert(
                    0,
                    KleKey::Props(KleKeyProps {
                        y: Some(y_diff),
                        ..Default::default()
                    }),
                ),
            }
        }
        keymap.push(row);
        cursor_y = required_y + 1.0;
    }

    Ok(VialJson {
        name: keyboard.keyboard_name.clone(),
        vendor_id: keyboard.usb.vid.clone(),
        product_id: keyboard.usb.pid.clone(),
        matrix: VialMatrix { rows, cols },
        layouts: VialLayouts {
            keymap,
            extra: Extra::new(),
        },
        extra: Extra::new(),
    })
}

fn build_kle_row(mut row_keys: Vec<&LayoutKey>) -> KleRow {
    row_keys.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut row = Vec::new();
    let mut current_x = 0.0;
    for key in row_keys {
        let key_x = round_unit(key.x);
        let key_w = round_unit(key.w);
        let key_h = round_unit(key.h);

        let props = KleKeyProps {
            x: (key_x != current_x).then_some(key_x - current_x),
            w: (key_w != 1.0).then_some(key_w),
            h: (key_h != 1.0).then_some(key_h),
            ..Default::default()
        };
        if props.has_values() {
            row.push(KleKey::Props(props));
        }
        row.push(KleKey::Label(format!("{},{}", key.matrix.0, key.matrix.1)));
        current_x = key_x + key_w;
    }
    row
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn keyboard(layout: serde_json::Value) -> KeyboardJson {
        serde_json::from_value(json!({
            "keyboard_name": "Test Keyboard",
            "usb": {"vid": "0xFEED", "pid": "0x0001", "device_version": "1.0.0"},
            "matrix_pins": {"cols": ["B1", "B2", "B3"], "rows": ["D1", "D2"]},
            "layouts": {"LAYOUT": {"layout": layout}}
        }))
        .unwrap()
    }

    #[test]
    fn test_generate_vial_json() {
        let kb = keyboard(json!([
            {"matrix": [0, 1], "x": 1, "y": 0},
            {"matrix": [0, 0], "x": 0, "y": 0},
            {"matrix": [1, 0], "x": 0.5, "y": 1, "w": 1.5}
        ]));
        let vial = generate_vial(&kb, "LAYOUT").unwrap();
        let value = serde_json::to_value(&vial).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Test Keyboard",
                "vendorId": "0xFEED",
                "productId": "0x0001",
                "matrix": {"rows": 2, "cols": 3},
                "layouts": {"keymap": [["0,0", "0,1"], [{"x": 0.5, "w": 1.5}, "1,0"]]}
            })
        );
    }

    #[test]
    fn test_row_gaps_and_rounding() {
        let kb = keyboard(json!([
            {"matrix": [0, 0], "x": 0, "y": 0.5},
            {"matrix": [1, 0], "x": 2, "y": 2.76},
            {"matrix": [1, 1], "x": 0, "y": 2.74, "h": 2}
        ]));
        let vial = generate_vial(&kb, "LAYOUT").unwrap();
        let value = serde_json::to_value(&vial.layouts.keymap).unwrap();
        assert_eq!(
            value,
            json!([
                [{"y": 0.5}, "0,0"],
                [{"h": 2.0, "y": 1.25}, "1,1", {"x": 1.0}, "1,0"]
            ])
        );
    }

    #[test]
    fn test_round_unit() {
        assert_eq!(round_unit(0.125), 0.0);
        assert_eq!(round_unit(0.375), 0.5);
        assert_eq!(round_unit(1.3), 1.25);
    }

    #[test]
    fn test_missing_layout() {
        let kb = keyboard(json!([]));
        assert!(generate_vial(&kb, "LAYOUT_all").is_err());
        let vial = generate_vial(&kb, "LAYOUT").unwrap();
        assert!(vial.layouts.keymap.is_empty());
    }
}
