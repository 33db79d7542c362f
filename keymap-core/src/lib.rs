//! # Keymap core
//!
//! A layered keymap runtime in the shape of a QMK keymap plugin:
//!
//! - [`keymap`] - per layer `(row, col)` action tables with transparency and a layer cache
//! - [`keyboard`] - key event processing, the `process_record_user` hook and the
//!   layer state hook which announces every layer change on the raw HID channel
//! - [`hid`] - reports and the writer traits the host firmware implements
//! - [`keyboards`] - the built-in keymaps
//!
//! Matrix scanning, debouncing and the USB stack are left to the host; they feed
//! [`event::KeyEvent`]s in and receive reports through [`hid::HidWriter`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod event;
pub mod greek;
pub mod hid;
pub mod keyboard;
pub mod keyboards;
pub mod keycode_convert;
pub mod keymap;
pub mod layout_macro;

pub use keymap_types as types;
pub use keymap_types::{action, keycode, layer, modifier};
