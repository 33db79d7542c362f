//! Converters between QMK keymap JSON, Vitaly layout dumps and Vial definitions.

mod command;
mod postprocess;
mod vial;
mod vitaly;

pub use command::run_output;
pub use postprocess::{TRANS_KEYS, postprocess_qmk_keymap};
pub use vial::generate_vial;
pub use vitaly::{
    LAYOUT_NAME, LayoutMap, default_layout_map, flatten_layer, generate_vitaly_layout, layout_map, parse_layers,
    qmk_keymap_from_vitaly, vitaly_to_qmk,
};

use crate::types::QmkKeymapJson;

/// Number of layers of a QMK keymap, 0 when it has none
pub fn count_layers(keymap: &QmkKeymapJson) -> usize {
    keymap.layers.as_ref().map_or(0, Vec::len)
}
