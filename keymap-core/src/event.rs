//! Events fed into the keyboard by the host firmware.

/// A key transition at a matrix position, `keyrecord_t` in QMK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn new(row: u8, col: u8, pressed: bool) -> Self {
        Self { row, col, pressed }
    }

    pub const fn press(row: u8, col: u8) -> Self {
        Self::new(row, col, true)
    }

    pub const fn release(row: u8, col: u8) -> Self {
        Self::new(row, col, false)
    }

    pub fn same_position(&self, other: &KeyEvent) -> bool {
        self.row == other.row && self.col == other.col
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// One detent of a rotary encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryEncoderEvent {
    pub id: u8,
    pub direction: Direction,
}
