//! Traits and types for HID message reporting.

use core::fmt;
use core::future::Future;

use keymap_types::protocol::layer_status::RAW_REPORT_SIZE;

/// Boot keyboard report, 6-key rollover
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub keycodes: [u8; 6],
}

/// Consumer page report, `usage_id` 0 means released
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaKeyboardReport {
    pub usage_id: u16,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemControlReport {
    pub usage_id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
    /// Media keyboard report
    MediaKeyboardReport(MediaKeyboardReport),
    /// System control report
    SystemControlReport(SystemControlReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// The host is not connected, the report is dropped
    Disconnected,
    BufferOverflow,
    /// Any other transport failure
    WriteFailed,
}

impl fmt::Display for HidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HidError::Disconnected => write!(f, "host disconnected"),
            HidError::BufferOverflow => write!(f, "report buffer overflow"),
            HidError::WriteFailed => write!(f, "report write failed"),
        }
    }
}

/// HidWriter is used for reporting key presses to the host, via USB, BLE, a simulator, etc.
pub trait HidWriter {
    /// Write report to the host, return the number of bytes written if success.
    fn write_report(&mut self, report: Report) -> impl Future<Output = Result<usize, HidError>>;
}

/// RawHidWriter sends vendor defined packets on the raw HID interface, `raw_hid_send` in QMK.
pub trait RawHidWriter {
    fn write_raw(&mut self, data: [u8; RAW_REPORT_SIZE]) -> impl Future<Output = Result<usize, HidError>>;
}
