//! Layer status record
//!
//! Every layer state change is announced to the host with one raw HID packet:
//!
//! | byte | content |
//! | --- | --- |
//! | 0 | report id |
//! | 1 | highest active layer |
//! | 2 | status: keyboard id in bits 0..=6, valid flag in bit 7 |
//! | 3..32 | zero |

use bitfield_struct::bitfield;

/// Size of a raw HID packet, same as the Vial endpoint size.
pub const RAW_REPORT_SIZE: usize = 32;

/// Report id used when the keyboard config doesn't set one.
pub const DEFAULT_LAYER_REPORT_ID: u8 = 0x01;

/// Largest keyboard id the status byte can carry.
pub const MAX_KEYBOARD_ID: u8 = 0x7F;

#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct LayerStatus {
    #[bits(7)]
    pub keyboard_id: u8,
    pub valid: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerStatusReport {
    pub report_id: u8,
    pub layer: u8,
    pub status: LayerStatus,
}

impl LayerStatusReport {
    /// Build a valid report, `keyboard_id` is truncated to 7 bits.
    pub const fn new(report_id: u8, layer: u8, keyboard_id: u8) -> Self {
        Self {
            report_id,
            layer,
            status: LayerStatus::new()
                .with_keyboard_id(keyboard_id & MAX_KEYBOARD_ID)
                .with_valid(true),
        }
    }

    pub fn keyboard_id(&self) -> u8 {
        self.status.keyboard_id()
    }

    pub fn to_bytes(&self) -> [u8; RAW_REPORT_SIZE] {
        let mut buf = [0u8; RAW_REPORT_SIZE];
        buf[0] = self.report_id;
        buf[1] = self.layer;
        buf[2] = self.status.into_bits();
        buf
    }

    /// Parse a received packet, `None` if it is too short or not marked valid.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < 3 {
            return None;
        }
        let status = LayerStatus::from_bits(buf[2]);
        if !status.valid() {
            return None;
        }
        Some(Self {
            report_id: buf[0],
            layer: buf[1],
            status,
        })
    }
}
