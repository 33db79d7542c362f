//! Host side tooling of the keymap workspace.
//!
//! Loads per keyboard `keyboard.toml` project settings, scans `keymap.c`, names QMK keycodes
//! and converts keymaps between QMK keymap JSON, Vitaly dumps and Vial definitions.

pub mod convert;
pub mod error;
pub mod json;
pub mod keycode_alias;
pub mod keycodes;
pub mod keymap_c;
pub mod project;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use keycode_alias::KEYCODE_ALIAS;
pub use project::{KeyboardConfig, ProjectContext};

// Init logger for tests
#[cfg(test)]
#[ctor::ctor]
fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
