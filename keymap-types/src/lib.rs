//! # Keymap Types
//!
//! Fundamental type definitions shared by the keymap runtime and the host tools.
//!
//! ## Modules
//!
//! - [`keycode`] - HID keycodes, consumer/system control keys and the QMK 16-bit keycode ranges
//! - [`modifier`] - Modifier key combinations and the HID modifier byte
//! - [`action`] - Key actions stored in a keymap (key taps, layer switches, user keycodes)
//! - [`layer`] - The active layer bit set
//! - [`protocol`] - The raw HID layer status record sent to the host
//!
//! ## Integration
//!
//! - **keymap-core**: the keymap runtime resolves and processes these actions
//! - **keymap-config**: QMK keycode names and JSON files are converted from/into these values

#![cfg_attr(not(test), no_std)]

pub mod action;
pub mod keycode;
pub mod layer;
pub mod modifier;
pub mod protocol;
