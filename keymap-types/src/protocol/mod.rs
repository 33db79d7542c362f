//! Communication protocol definitions.
//!
//! - [`layer_status`] - The raw HID record announcing the active layer to the host

pub mod layer_status;
